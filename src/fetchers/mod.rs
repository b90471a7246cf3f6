mod avatar;
mod embed;
mod request;

pub use avatar::AvatarLookup;
pub use embed::{fallback_embed, Embed, OEmbedClient};
pub use request::RequestFetcher;
