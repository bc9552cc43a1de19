
pub use app::make_test_app;
