pub mod http_retry;
