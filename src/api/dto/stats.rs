//! DTOs for the click analytics endpoints.

use serde::Serialize;

use crate::domain::repositories::{
    LinkClickStats, OwnerClickSummary, ShortcodeCount, UserAgentCount,
};

/// Body of `GET /api/stats/{shortcode}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStatsResponse {
    pub shortcode: String,
    pub total_clicks: i64,
    pub clicks_today: i64,
    pub clicks_this_week: i64,
    pub top_user_agents: Vec<UserAgentEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAgentEntry {
    pub user_agent: String,
    pub count: i64,
}

impl LinkStatsResponse {
    pub fn new(shortcode: String, stats: LinkClickStats) -> Self {
        Self {
            shortcode,
            total_clicks: stats.total_clicks,
            clicks_today: stats.clicks_last_day,
            clicks_this_week: stats.clicks_last_week,
            top_user_agents: stats
                .top_user_agents
                .into_iter()
                .map(|UserAgentCount { user_agent, count }| UserAgentEntry { user_agent, count })
                .collect(),
        }
    }
}

/// Body of `GET /api/stats/summary`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_clicks: i64,
    pub total_urls: i64,
    pub clicks_today: i64,
    pub top_shortcodes: Vec<ShortcodeEntry>,
}

#[derive(Debug, Serialize)]
pub struct ShortcodeEntry {
    pub shortcode: String,
    pub count: i64,
}

impl From<OwnerClickSummary> for SummaryResponse {
    fn from(summary: OwnerClickSummary) -> Self {
        Self {
            total_clicks: summary.total_clicks,
            total_urls: summary.clicked_links,
            clicks_today: summary.clicks_last_day,
            top_shortcodes: summary
                .top_shortcodes
                .into_iter()
                .map(|ShortcodeCount { shortcode, count }| ShortcodeEntry { shortcode, count })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_stats_serializes_camel_case() {
        let body = LinkStatsResponse::new(
            "abc1234".to_string(),
            LinkClickStats {
                total_clicks: 4,
                clicks_last_day: 1,
                clicks_last_week: 3,
                top_user_agents: vec![UserAgentCount {
                    user_agent: "TestBot/1.0".to_string(),
                    count: 4,
                }],
            },
        );

        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["totalClicks"], 4);
        assert_eq!(json["clicksToday"], 1);
        assert_eq!(json["clicksThisWeek"], 3);
        assert_eq!(json["topUserAgents"][0]["userAgent"], "TestBot/1.0");
    }

    #[test]
    fn test_summary_reports_clicked_links_as_total_urls() {
        let json = serde_json::to_value(SummaryResponse::from(OwnerClickSummary {
            total_clicks: 7,
            clicked_links: 2,
            clicks_last_day: 0,
            top_shortcodes: vec![],
        }))
        .unwrap();

        assert_eq!(json["totalUrls"], 2);
        assert_eq!(json["topShortcodes"], serde_json::json!([]));
    }
}
