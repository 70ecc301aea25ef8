pub(crate) mod artifact;
pub(crate) mod clock;
pub(crate) mod opts;
pub(crate) mod orchestrator;
pub(crate) mod render_loop;
pub(crate) mod state;
