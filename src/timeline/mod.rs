pub(crate) mod allocate;
pub(crate) mod cue;
