use crate::models::{AdvisorConfig, PredictedCollege};
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Client for the narrative-generation service. Both narratives are
/// best-effort extras: callers log failures and move on, the college list
/// never depends on them.
pub struct AdmissionAdvisor {
    client: reqwest::Client,
    config: AdvisorConfig,
}

impl AdmissionAdvisor {
    pub fn new(config: AdvisorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// How cutoff ranks for the chosen branch have moved over past years.
    pub async fn analyze_rank_trend(
        &self,
        category: &str,
        gender: &str,
        branch: &str,
    ) -> Result<String> {
        let prompt = format!(
            "You are an expert college admissions counselor. Analyze the cutoff ranks \
             for similar colleges over the past years based on the following information:\n\n\
             Rank Category: {}\nGender: {}\nBranch: {}\n\n\
             Provide an analysis of how the cutoff ranks have changed over the past years \
             for similar colleges, to gauge the chances of getting in this year.",
            category, gender, branch
        );
        self.complete(&prompt).await
    }

    /// Personalized suitability summary for one predicted college.
    pub async fn summarize_college(
        &self,
        college: &PredictedCollege,
        preferences: &str,
        branch_note: &str,
    ) -> Result<String> {
        let stated = if preferences.trim().is_empty() {
            "None explicitly stated".to_string()
        } else {
            preferences.trim().to_string()
        };
        let prompt = format!(
            "You are an expert college advisor. Provide a personalized summary of the \
             following college, assessing its suitability specifically for this student \
             based on their provided preferences.\n\n\
             College Details:\n\
             Institute Code: {}\n\
             College Name: {}\n\
             Tuition Fee: {}\n\
             Cutoff Rank: {}\n\
             Location: {}, {}\n\n\
             User's stated preferences: \"{}\"\n\
             Branch preferences: {}\n\n\
             Highlight the college's best features and potential drawbacks from the \
             student's perspective, address how it aligns with the stated preferences, \
             and conclude with a clear overall assessment of the fit. If no preferences \
             were stated, focus on general strengths and weaknesses.",
            college.inst_code,
            college.college_name,
            college.tuition_fee,
            college.cutoff_display,
            college.place,
            college.district,
            stated,
            branch_note
        );
        self.complete(&prompt).await
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let timeout = self.config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(timeout))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to reach advisor endpoint: {}", self.config.endpoint))?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Advisor request failed with status: {}",
                response.status()
            ));
        }

        let payload: Value = response
            .json()
            .await
            .context("Failed to read advisor response body")?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|text| text.trim().to_string())
            .ok_or_else(|| anyhow::anyhow!("Advisor response carried no message content"))
    }
}

/// Description of the candidate's branch selection for the summary prompt.
pub fn branch_preference_note(branches: &[String], any_branch: bool) -> String {
    if any_branch {
        "The user is open to all branches.".to_string()
    } else {
        format!("The user is interested in {}.", branches.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_note_reflects_selection() {
        let branches = vec!["CSE".to_string(), "ECE".to_string()];
        assert_eq!(
            branch_preference_note(&branches, false),
            "The user is interested in CSE, ECE."
        );
        assert_eq!(
            branch_preference_note(&branches, true),
            "The user is open to all branches."
        );
    }
}
