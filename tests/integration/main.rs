//! Integration tests: full HTTP → estimator → mock LLM round trips.

mod estimate_flow;
mod mock_llm;
