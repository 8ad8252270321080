//! Shared constants for end-to-end tests
//!
//! When test users or sample media change, update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user, owns no videos at startup
pub const TEST_USER: &str = "testuser";

/// Regular test user password
pub const TEST_PASS: &str = "testpass123";

/// Second regular user, useful for ownership checks
pub const OTHER_USER: &str = "otheruser";

/// Second regular user password
pub const OTHER_PASS: &str = "otherpass123";

/// Registered under the bootstrap admin name, so it is an Admin
pub const ADMIN_USER: &str = "Dregot";

/// Admin test user password
pub const ADMIN_PASS: &str = "adminpass123";

// ============================================================================
// Sample media
// ============================================================================

/// Smallest header recognized as an MP4 file
pub const SAMPLE_MP4: &[u8] = &[
    0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', b'i', b's', b'o', b'm', 0x00, 0x00, 0x02, 0x00,
    b'i', b's', b'o', b'm', b'm', b'p', b'4', b'1',
];

/// PNG signature followed by a few padding bytes
pub const SAMPLE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

// ============================================================================
// Timing
// ============================================================================

/// How long to wait for a spawned server to answer
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Per request timeout of the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Delay between readiness checks
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
