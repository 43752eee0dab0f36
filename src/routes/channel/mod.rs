mod handler;

pub use handler::channel_profile;
