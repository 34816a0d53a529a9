// Messaging - Lock-free communication with the audio thread

pub mod channels;
pub mod command;
