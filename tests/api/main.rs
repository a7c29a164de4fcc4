mod helpers;

// all integration tests live in this one binary: each file under tests/ is
// compiled and linked as its own executable, and linking is sequential, so one
// binary keeps the test suite quick to build.
//
// the backend is never real; every test gets its own `wiremock::MockServer`,
// which also asserts on how many requests it received when it is dropped.
