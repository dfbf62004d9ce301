pub mod youtube_api;
