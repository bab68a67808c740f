use tracing::debug;

use crate::model::bucket::{Bucket, RouteResult, SubBucket};

const SUB_BUCKET_BONUS: usize = 2;
const DOMAIN_MATCH_SCORE: usize = 2;
const DOMAIN_SUB_BUCKET_BONUS: usize = 1;
const INBOX_NAME: &str = "inbox";

const ENGINEERING_KEYWORDS: &[&str] = &[
    "engineering", "review", "pull request", "pr", "merge", "code", "deploy", "bug", "dev",
    "sprint", "release",
];
const FINANCE_KEYWORDS: &[&str] = &[
    "finance", "invoice", "payment", "pay", "budget", "expense", "billing", "reimburse",
];
const CLIENT_KEYWORDS: &[&str] = &[
    "follow up", "follow-up", "followup", "contact", "crm", "client", "customer", "prospect",
];

/// (keywords, fragment of the destination bucket name), tried in order.
const DOMAIN_RULES: &[(&[&str], &str)] = &[
    (ENGINEERING_KEYWORDS, "eng"),
    (ENGINEERING_KEYWORDS, "dev"),
    (FINANCE_KEYWORDS, "financ"),
    (CLIENT_KEYWORDS, "crm"),
    (CLIENT_KEYWORDS, "work"),
];

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    bucket: &'a Bucket,
    sub_bucket: Option<&'a SubBucket>,
    score: usize,
}

impl Candidate<'_> {
    fn into_result(self) -> RouteResult {
        RouteResult {
            bucket_id: self.bucket.id.clone(),
            sub_bucket_id: self.sub_bucket.map(|s| s.id.clone()),
        }
    }
}

/// Lowercased content plus its word tokens, shared by every stage.
struct RouteInput {
    content: String,
    tokens: Vec<String>,
}

impl RouteInput {
    fn new(content: &str) -> Self {
        let content = content.to_lowercase();
        let tokens = content
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() > 1)
            .map(str::to_string)
            .collect();
        Self { content, tokens }
    }
}

/// Picks the destination bucket (and sub-bucket) for an item.
///
/// Stages, first success wins:
/// 1. `hint` names a bucket (either name contains the other).
/// 2. Best score from content tokens found in bucket names, then from the
///    fixed domain keyword table. A later candidate must score strictly
///    higher to replace an earlier one.
/// 3. A bucket named like "inbox", else the first bucket.
///
/// With no buckets at all the result has an empty `bucket_id`.
pub fn route(content: &str, hint: Option<&str>, buckets: &[Bucket]) -> RouteResult {
    let input = RouteInput::new(content);

    if let Some(candidate) = hint.and_then(|h| match_hint(h, &input, buckets)) {
        debug!(bucket = %candidate.bucket.name, "routed by hint");
        return candidate.into_result();
    }

    let best = keyword_candidates(&input, buckets)
        .chain(domain_candidates(&input, buckets))
        .fold(None, keep_better);
    if let Some(candidate) = best {
        debug!(bucket = %candidate.bucket.name, score = candidate.score, "routed by score");
        return candidate.into_result();
    }

    match fallback_bucket(buckets) {
        Some(bucket) => {
            debug!(bucket = %bucket.name, "routed to fallback bucket");
            RouteResult {
                bucket_id: bucket.id.clone(),
                sub_bucket_id: None,
            }
        }
        None => {
            debug!("no bucket available");
            RouteResult::unrouted()
        }
    }
}

fn keep_better<'a>(best: Option<Candidate<'a>>, candidate: Candidate<'a>) -> Option<Candidate<'a>> {
    let best_score = best.map_or(0, |b| b.score);
    if candidate.score > best_score {
        Some(candidate)
    } else {
        best
    }
}

fn match_hint<'a>(hint: &str, input: &RouteInput, buckets: &'a [Bucket]) -> Option<Candidate<'a>> {
    let hint = hint.trim().to_lowercase();
    if hint.is_empty() {
        return None;
    }

    buckets
        .iter()
        .find(|bucket| {
            let name = bucket.name.trim().to_lowercase();
            !name.is_empty() && (hint.contains(&name) || name.contains(&hint))
        })
        .map(|bucket| Candidate {
            bucket,
            sub_bucket: match_sub_bucket(input, &bucket.sub_buckets),
            score: 0,
        })
}

fn keyword_candidates<'a, 'i>(
    input: &'i RouteInput,
    buckets: &'a [Bucket],
) -> impl Iterator<Item = Candidate<'a>> + 'i
where
    'a: 'i,
{
    buckets.iter().map(move |bucket| {
        let name = bucket.name.to_lowercase();
        let hits = input.tokens.iter().filter(|t| name.contains(t.as_str())).count();
        let sub_bucket = match_sub_bucket(input, &bucket.sub_buckets);
        let bonus = if sub_bucket.is_some() { SUB_BUCKET_BONUS } else { 0 };
        Candidate {
            bucket,
            sub_bucket,
            score: hits + bonus,
        }
    })
}

fn domain_candidates<'a, 'i>(
    input: &'i RouteInput,
    buckets: &'a [Bucket],
) -> impl Iterator<Item = Candidate<'a>> + 'i
where
    'a: 'i,
{
    DOMAIN_RULES
        .iter()
        .filter(move |(keywords, _)| keywords.iter().any(|k| input.content.contains(k)))
        .filter_map(move |(_, target)| {
            let bucket = buckets
                .iter()
                .find(|b| b.name.to_lowercase().contains(target))?;
            let sub_bucket = match_sub_bucket(input, &bucket.sub_buckets);
            let bonus = if sub_bucket.is_some() { DOMAIN_SUB_BUCKET_BONUS } else { 0 };
            Some(Candidate {
                bucket,
                sub_bucket,
                score: DOMAIN_MATCH_SCORE + bonus,
            })
        })
}

/// First sub-bucket whose name appears in the content, or whose name
/// contains one of the content tokens.
fn match_sub_bucket<'a>(input: &RouteInput, sub_buckets: &'a [SubBucket]) -> Option<&'a SubBucket> {
    sub_buckets.iter().find(|sub| {
        let name = sub.name.trim().to_lowercase();
        if name.is_empty() {
            return false;
        }
        input.content.contains(&name)
            || input
                .tokens
                .iter()
                .any(|t| t.chars().count() >= 2 && name.contains(t.as_str()))
    })
}

fn fallback_bucket(buckets: &[Bucket]) -> Option<&Bucket> {
    buckets
        .iter()
        .find(|b| b.name.to_lowercase().contains(INBOX_NAME))
        .or_else(|| buckets.first())
}
