use chrono::FixedOffset;
use locimo_core::DashboardEngine;
use locimo_core::auth::SessionAuth;
use locimo_core::repository::Resources;
use locimo_core::store::DocumentStore;

#[derive(Debug, Clone)]
pub struct LocimoEngine<S> {
    resources: Resources<S>,
    session: SessionAuth,
    zone: FixedOffset,
}

impl<S: DocumentStore> LocimoEngine<S> {
    pub fn new(store: S, session: SessionAuth, zone: FixedOffset) -> Self {
        Self {
            resources: Resources::new(store),
            session,
            zone,
        }
    }
}

impl<S: DocumentStore> DashboardEngine for LocimoEngine<S> {
    type Store = S;
    type Auth = SessionAuth;

    fn resources(&self) -> Resources<Self::Store> {
        self.resources.clone()
    }

    fn auth(&self) -> Self::Auth {
        self.session.clone()
    }

    fn calendar_zone(&self) -> FixedOffset {
        self.zone
    }
}
