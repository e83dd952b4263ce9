//! Test suite for favfeed
//!
//! This module organizes all tests
