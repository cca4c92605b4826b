//! Read-through follower lists.

use crate::context::CacheContext;
use crate::error::Result;
use murmur_core::keys;
use murmur_core::model::{GroupId, PersonId};

pub fn person_follower_ids(ctx: CacheContext<'_>, person: PersonId) -> Result<Vec<PersonId>> {
    ctx.read_through_list(&keys::followers_by_person(person), || {
        ctx.records.person_follower_ids(person)
    })
}

pub fn group_follower_ids(ctx: CacheContext<'_>, group: GroupId) -> Result<Vec<PersonId>> {
    ctx.read_through_list(&keys::followers_by_group(group), || {
        ctx.records.group_follower_ids(group)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::records::RecordStore;
    use crate::testing::Fixture;

    #[test]
    fn followers_are_cached_until_evicted() {
        let fx = Fixture::new();
        let smithers = fx.person("smithers");
        let burns = fx.person("mrburns");
        let lenny = fx.person("lenny");
        fx.records.follow_person(burns.id, smithers.id).unwrap();

        assert_eq!(person_follower_ids(fx.ctx(), smithers.id).unwrap(), vec![burns.id]);

        fx.records.follow_person(lenny.id, smithers.id).unwrap();
        assert_eq!(person_follower_ids(fx.ctx(), smithers.id).unwrap(), vec![burns.id]);

        fx.cache.delete(&keys::followers_by_person(smithers.id)).unwrap();
        assert_eq!(
            person_follower_ids(fx.ctx(), smithers.id).unwrap(),
            vec![burns.id, lenny.id]
        );
    }

    #[test]
    fn group_without_followers_caches_empty_list() {
        let fx = Fixture::new();
        let group = fx.group("plant");
        assert!(group_follower_ids(fx.ctx(), group.id).unwrap().is_empty());
        assert_eq!(
            fx.cache.get_list(&keys::followers_by_group(group.id)).unwrap(),
            Some(vec![])
        );
    }
}
