//! End-to-end pipeline scenarios.
//!
//! Every stage runs for real against [`ScriptedLlm`], which answers from the
//! canned replies in `test_data/stages/`. Only the model transport is faked.
//!
//! [`ScriptedLlm`]: crate::test_fixtures::ScriptedLlm

mod unit_tools_tests;
