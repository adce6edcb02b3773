//! Monetary cost estimation for generation calls.

use assistant_llm::LlmUsage;

/// Per-1k-token rates for one backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub prompt_per_1k: f64,
    pub completion_per_1k: f64,
}

const PRICING: &[(&str, Pricing)] = &[
    (
        "openai/gpt-3.5-turbo",
        Pricing {
            prompt_per_1k: 0.0015,
            completion_per_1k: 0.002,
        },
    ),
    (
        "openai/gpt-4o",
        Pricing {
            prompt_per_1k: 0.03,
            completion_per_1k: 0.06,
        },
    ),
    (
        "openai/gpt-4o-mini",
        Pricing {
            prompt_per_1k: 0.03,
            completion_per_1k: 0.06,
        },
    ),
];

/// Rates for an exact backend identifier, if it is priced.
pub fn pricing(backend: &str) -> Option<Pricing> {
    PRICING
        .iter()
        .find(|(name, _)| *name == backend)
        .map(|(_, pricing)| *pricing)
}

/// Estimated cost of `usage` on `backend`.
///
/// Unpriced identifiers, including every local backend, cost nothing.
pub fn calculate_cost(backend: &str, usage: &LlmUsage) -> f64 {
    match pricing(backend) {
        Some(rates) => {
            (f64::from(usage.prompt_tokens) * rates.prompt_per_1k
                + f64::from(usage.completion_tokens) * rates.completion_per_1k)
                / 1000.0
        }
        None => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_priced_backends() {
        let usage = LlmUsage::new(1000, 500);

        assert!(approx(calculate_cost("openai/gpt-4o", &usage), 0.06));
        assert!(approx(calculate_cost("openai/gpt-4o-mini", &usage), 0.06));
        assert!(approx(
            calculate_cost("openai/gpt-3.5-turbo", &LlmUsage::new(2000, 1000)),
            0.005
        ));
    }

    #[test]
    fn test_unpriced_backends_are_free() {
        let usage = LlmUsage::new(1000, 500);

        assert_eq!(calculate_cost("ollama/llama3", &usage), 0.0);
        assert_eq!(calculate_cost("openai/gpt-4", &usage), 0.0);
        // Lookup is exact
        assert_eq!(calculate_cost("OpenAI/gpt-4o", &usage), 0.0);
    }

    #[test]
    fn test_zero_usage_costs_nothing() {
        assert_eq!(calculate_cost("openai/gpt-4o", &LlmUsage::zero()), 0.0);
    }
}
