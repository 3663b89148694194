mod smoke_tests;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - calendar_store_mock: full runs against an in-memory calendar store
// - smoke_tests: configuration and policy through the public API
