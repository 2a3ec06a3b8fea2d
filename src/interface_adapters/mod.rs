// Interface adapters: wire protocol, network handling, storage and audio sinks.

pub mod audio;
pub mod http;
pub mod net;
pub mod protocol;
pub mod state;
pub mod storage;
