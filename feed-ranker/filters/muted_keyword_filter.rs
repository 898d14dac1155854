use crate::candidate_pipeline::candidate::PostCandidate;
use crate::candidate_pipeline::query::ScoredPostsQuery;
use crate::util::tokenizer::tokenize;
use async_trait::async_trait;
use candidate_pipeline::StageError;
use candidate_pipeline::filter::{Filter, FilterResult};

/// Removes posts whose text contains one of the viewer's muted phrases as
/// whole tokens.
pub struct MutedKeywordFilter;

#[async_trait]
impl Filter<ScoredPostsQuery, PostCandidate> for MutedKeywordFilter {
    async fn filter(
        &self,
        query: &ScoredPostsQuery,
        candidates: Vec<PostCandidate>,
    ) -> Result<FilterResult<PostCandidate>, StageError> {
        let matcher = &query.viewer.muted_phrases;
        if matcher.is_empty() {
            return Ok(FilterResult::pass_through(candidates));
        }

        let (removed, kept): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|c| matcher.matches(&tokenize(&c.text)));

        Ok(FilterResult { kept, removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{ids, post, query};
    use crate::util::tokenizer::MutedPhraseMatcher;

    fn with_text(post_id: u64, text: &str) -> PostCandidate {
        PostCandidate {
            text: text.to_string(),
            ..post(post_id, 10)
        }
    }

    #[tokio::test]
    async fn whole_word_matches_only() {
        let mut q = query();
        q.viewer.muted_phrases = MutedPhraseMatcher::new(&["cat", "season finale"]);
        let candidates = vec![
            with_text(1, "Look at my cat!"),
            with_text(2, "A new category of bugs"),
            with_text(3, "the SEASON finale tonight"),
            with_text(4, "season two finale"),
        ];
        let result = MutedKeywordFilter.filter(&q, candidates).await.unwrap();
        assert_eq!(ids(&result.kept), vec![2, 4]);
        assert_eq!(ids(&result.removed), vec![1, 3]);
    }

    #[tokio::test]
    async fn no_mutes_keeps_everything() {
        let result = MutedKeywordFilter
            .filter(&query(), vec![with_text(1, "cat")])
            .await
            .unwrap();
        assert_eq!(ids(&result.kept), vec![1]);
    }
}
