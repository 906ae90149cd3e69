use crate::config::AssistantConfig;

// Substring match: "reconstruction" passes on "construction"
#[derive(Debug, Clone)]
pub struct TopicFilter {
    keywords: Vec<String>,
}

impl TopicFilter {
    pub fn new(config: &AssistantConfig) -> Self {
        Self {
            keywords: config.keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn is_in_scope(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && lowered.contains(keyword.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> TopicFilter {
        TopicFilter::new(&AssistantConfig::default())
    }

    #[test]
    fn keyword_in_any_case_is_in_scope() {
        assert!(filter().is_in_scope("Tell me about CONCRETE mixes"));
        assert!(filter().is_in_scope("What are common foundation types?"));
        assert!(filter().is_in_scope("hvac sizing for a duplex"));
    }

    #[test]
    fn unrelated_questions_are_rejected() {
        assert!(!filter().is_in_scope("What's the weather today?"));
        assert!(!filter().is_in_scope("What's a good pizza recipe?"));
    }

    #[test]
    fn empty_input_is_out_of_scope() {
        assert!(!filter().is_in_scope(""));
    }

    #[test]
    fn unlisted_trade_terms_do_not_count() {
        assert!(!filter().is_in_scope("What is the best REBAR size?"));
    }

    #[test]
    fn substring_matches_are_accepted() {
        assert!(filter().is_in_scope("the reconstruction era after the civil war"));
        assert!(filter().is_in_scope("best outdoors hikes"));
        assert!(filter().is_in_scope("how do I debug my source code"));
    }

    #[test]
    fn custom_keywords_are_lowercased() {
        let config = AssistantConfig {
            keywords: vec!["Rebar".to_string()],
            ..AssistantConfig::default()
        };
        let filter = TopicFilter::new(&config);
        assert!(filter.is_in_scope("REBAR spacing"));
        assert!(!filter.is_in_scope("concrete"));
    }
}
