pub mod auth;
pub mod mock_data;
