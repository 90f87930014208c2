use std::sync::Arc;
use storage::Db;

use crate::csrf::CsrfGuard;
use crate::gate::Authorizer;
use crate::redirect::RedirectPolicy;
use crate::render::BodyRenderer;

/// Built once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub authorizer: Arc<dyn Authorizer>,
    pub csrf: CsrfGuard,
    pub renderer: Arc<dyn BodyRenderer>,
    pub redirects: RedirectPolicy,
}
