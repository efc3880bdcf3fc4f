mod booking;
mod chat;
mod dashboard;
mod normalize;
mod poller;
mod prefs;
mod settings;
mod status;
mod token;

pub use booking::*;
pub use chat::*;
pub use dashboard::*;
pub use normalize::*;
pub use poller::*;
pub use prefs::*;
pub use settings::*;
pub use status::*;
pub use token::*;
