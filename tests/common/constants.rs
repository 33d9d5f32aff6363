//! Shared constants for end-to-end tests
//!
//! When test data changes (user credentials, sample texts, etc.),
//! update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user email
pub const TEST_EMAIL: &str = "test@example.com";

/// Regular test user password
pub const TEST_PASS: &str = "testpass123";

/// Regular test user display name
pub const TEST_NAME: &str = "Test User";

/// Second user, used to check that data does not leak between accounts
pub const OTHER_EMAIL: &str = "other@example.com";

pub const OTHER_PASS: &str = "otherpass123";

pub const OTHER_NAME: &str = "Other User";

// ============================================================================
// Sample Texts
// ============================================================================

/// Detected as happy
pub const HAPPY_TEXT: &str = "I'm so happy and excited for the weekend!";

/// Detected as sad
pub const SAD_TEXT: &str = "I feel sad and lonely today...";

/// Detected as calm
pub const CALM_TEXT: &str = "I need calm music for studying and focus";

/// Longest text the test server accepts
pub const TEST_MAX_TEXT_LENGTH: usize = 200;

// ============================================================================
// Fake Generator
// ============================================================================

/// Sampling rate of the fake generator output
pub const TEST_SAMPLING_RATE: u32 = 8_000;

/// Samples per channel the fake generator produces
pub const TEST_SAMPLE_COUNT: usize = 800;

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
