use acmcore::entity::EntityRow;

use crate::{
    current::CurrentAcl,
    platform::Platform,
    schedule::Schedule,
};

/// The ACL state of one entity: the ACL in force and the transitions
/// scheduled for it.
///
/// The transition list is kept sorted by date after every change; entries
/// are addressed by their [`EntryKey`](crate::schedule::EntryKey).
pub struct Scheduler {
    platform: Platform,
    row: EntityRow,
    active: CurrentAcl,
    schedules: Vec<Schedule>,
    collapsed: bool,
}

mod impls;
