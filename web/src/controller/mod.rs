pub(crate) mod channel_controller;
