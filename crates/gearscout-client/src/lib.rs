pub mod fetcher;
pub mod sites;

pub use fetcher::ReqwestFetcher;
pub use sites::default_sites;
