mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "murmur", about = "Activity streams with a consistent read cache", version)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new murmur repository
    Init,

    /// Manage organizations
    Org {
        #[command(subcommand)]
        action: OrgAction,
    },

    /// Manage people
    Person {
        #[command(subcommand)]
        action: PersonAction,
    },

    /// Manage groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Follow a person or group
    Follow {
        /// Account id of the follower
        follower: String,

        /// What to follow (person:<account> or group:<short name>)
        target: String,
    },

    /// Post an activity
    Post {
        /// Activity text
        body: String,

        /// Account id of the author
        #[arg(long = "as")]
        actor: String,

        /// Destination stream (person:<account> or group:<short name>); defaults to the author
        #[arg(long)]
        to: Option<String>,

        /// Shared link URL
        #[arg(long)]
        link: Option<String>,

        /// Keep the activity out of the everyone stream
        #[arg(long)]
        hidden: bool,
    },

    /// Delete an activity with its comments
    Delete {
        /// Activity id
        id: i64,
    },

    /// Manage comments
    Comment {
        #[command(subcommand)]
        action: CommentAction,
    },

    /// Star an activity
    Star {
        /// Activity id
        id: i64,

        /// Account id of the person starring
        #[arg(long = "as")]
        person: String,
    },

    /// Read and manage composite streams
    Stream {
        #[command(subcommand)]
        action: StreamAction,
    },

    /// Show an activity and its comments
    Show {
        /// Activity id
        id: i64,
    },

    /// Rebuild every cached list from the records
    Warm,
}

#[derive(Subcommand)]
enum OrgAction {
    /// Create an organization; without --parent it becomes the root
    Add {
        short_name: String,

        #[arg(long)]
        name: Option<String>,

        /// Parent organization short name
        #[arg(long)]
        parent: Option<String>,
    },
}

#[derive(Subcommand)]
enum PersonAction {
    /// Create a person
    Add {
        account_id: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Parent organization short name
        #[arg(long)]
        org: String,
    },
}

#[derive(Subcommand)]
enum GroupAction {
    /// Create a group
    Add {
        short_name: String,

        #[arg(long)]
        name: Option<String>,

        /// Parent organization short name
        #[arg(long)]
        org: String,
    },
}

#[derive(Subcommand)]
enum CommentAction {
    /// Comment on an activity
    Add {
        /// Activity id
        activity: i64,

        /// Comment text
        body: String,

        /// Account id of the author
        #[arg(long = "as")]
        author: String,
    },
    /// Delete a comment
    Delete {
        /// Comment id
        id: i64,
    },
}

#[derive(Subcommand)]
enum StreamAction {
    /// List composite streams
    List,
    /// Print the activity ids of a stream, newest first
    Ids {
        id: i64,

        /// Account id of the viewer
        #[arg(long = "as")]
        viewer: String,
    },
    /// Print the activities of a stream, newest first
    Show {
        id: i64,

        /// Account id of the viewer
        #[arg(long = "as")]
        viewer: String,
    },
    /// Create a custom stream
    Create {
        name: String,

        /// Account id of the owner
        #[arg(long = "as")]
        owner: String,

        /// Included scope (type:key, repeatable)
        #[arg(long)]
        scope: Vec<String>,
    },
    /// Add a scope to a custom stream
    AddScope {
        id: i64,

        /// Scope to add (type:key)
        scope: String,
    },
    /// Remove a scope from a custom stream
    RemoveScope {
        id: i64,

        /// Scope to remove (type:key)
        scope: String,
    },
    /// Delete a custom stream
    Delete { id: i64 },
    /// Print the ids of activities that shared a link
    Resource { url: String },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MURMUR_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Org { action } => match action {
            OrgAction::Add {
                short_name,
                name,
                parent,
            } => commands::org::add(short_name, name, parent, cli.json),
        },
        Commands::Person { action } => match action {
            PersonAction::Add {
                account_id,
                name,
                org,
            } => commands::person::add(account_id, name, org, cli.json),
        },
        Commands::Group { action } => match action {
            GroupAction::Add {
                short_name,
                name,
                org,
            } => commands::group::add(short_name, name, org, cli.json),
        },
        Commands::Follow { follower, target } => commands::follow::run(follower, target),
        Commands::Post {
            body,
            actor,
            to,
            link,
            hidden,
        } => commands::post::run(actor, to, body, link, hidden, cli.json),
        Commands::Delete { id } => commands::delete::run(id),
        Commands::Comment { action } => match action {
            CommentAction::Add {
                activity,
                body,
                author,
            } => commands::comment::add(activity, author, body, cli.json),
            CommentAction::Delete { id } => commands::comment::delete(id),
        },
        Commands::Star { id, person } => commands::star::run(id, person),
        Commands::Stream { action } => match action {
            StreamAction::List => commands::stream::list(cli.json),
            StreamAction::Ids { id, viewer } => commands::stream::ids(id, viewer, cli.json),
            StreamAction::Show { id, viewer } => commands::stream::show(id, viewer, cli.json),
            StreamAction::Create { name, owner, scope } => {
                commands::stream::create(name, owner, scope, cli.json)
            }
            StreamAction::AddScope { id, scope } => commands::stream::add_scope(id, scope),
            StreamAction::RemoveScope { id, scope } => commands::stream::remove_scope(id, scope),
            StreamAction::Delete { id } => commands::stream::delete(id),
            StreamAction::Resource { url } => commands::stream::resource(url, cli.json),
        },
        Commands::Show { id } => commands::show::run(id, cli.json),
        Commands::Warm => commands::warm::run(cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
