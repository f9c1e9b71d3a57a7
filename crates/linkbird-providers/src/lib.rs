//! # Linkbird Providers
//!
//! Built-in providers for well-known sites.
//!
//! | Provider | Hosts | Whole-message handler |
//! |----------|-------|-----------------------|
//! | [`XkcdProvider`] | `xkcd.com` | no |
//! | [`RedditProvider`] | `reddit.com` | `/r/<sub>` and `/u/<name>` mentions |
//! | [`GithubProvider`] | `github.com`, `gist.github.com` | no |
//! | [`YoutubeProvider`] | `youtube.com`, `youtu.be` | no |
//!
//! GitHub and YouTube need credentials, so the runtime only registers them
//! when a token or API key is configured.
//!
//! ```rust,ignore
//! let registry = Registry::new()
//!     .with(&XkcdProvider::new())
//!     .with(&RedditProvider::new(DEFAULT_REDDIT_API))
//!     .with(&GithubProvider::new(github_token));
//! ```

mod format;
pub mod github;
pub mod reddit;
pub mod xkcd;
pub mod youtube;

#[cfg(test)]
mod testing;

pub use github::{DEFAULT_GITHUB_API, GithubProvider};
pub use reddit::{DEFAULT_REDDIT_API, RedditProvider};
pub use xkcd::XkcdProvider;
pub use youtube::{DEFAULT_YOUTUBE_API, YoutubeProvider};
