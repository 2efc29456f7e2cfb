//! Scenario tests that span more than one module.
