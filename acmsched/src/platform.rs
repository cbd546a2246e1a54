use acmcore::{
    acl::AclTemplates,
    traits::AclManagerBackend,
    transition::TransitionsFor,
    workflow::WorkflowDefinitions,
};
use parking_lot::{
    Mutex,
    RwLock,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::AtomicU64,
        Arc,
    },
};
use tokio::sync::OnceCell;

use crate::workflow::ConfigPanel;

/// Placeholder option when no ACL template could be listed.
pub const NO_ACL_AVAILABLE: &str = "-- No ACL available --";
/// Label of the empty workflow option.
pub const NO_WORKFLOW: &str = "-- No workflow --";

#[derive(Default)]
pub struct Builder {
    backend: Option<Box<dyn AclManagerBackend>>,
    // fetch transitions already done, as the history view does
    done: bool,
}

/// The service object shared by every scheduler of a page session.
///
/// Owns the backend and the reference caches; cloning is cheap.
#[derive(Clone)]
pub struct Platform(Arc<PlatformInner>);

pub(crate) struct PlatformInner {
    backend: Box<dyn AclManagerBackend>,
    done: bool,
    acls: OnceCell<AclTemplates>,
    workflows: OnceCell<WorkflowDefinitions>,
    panels: Mutex<HashMap<String, Arc<ConfigPanel>>>,
    transitions: RwLock<Option<Arc<TransitionsFor>>>,
    keys: AtomicU64,
    tokens: AtomicU64,
}

mod impls;
