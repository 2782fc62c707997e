pub(crate) mod channels;
pub(crate) mod io;
pub(crate) mod resample;
