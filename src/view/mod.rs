pub mod post_renderer;
