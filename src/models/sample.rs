use serde::{Deserialize, Deserializer};

/// Fixed schema for the stats API's bridge response. A missing or mis-typed
/// field fails the parse at the fetch boundary.
#[derive(Debug, Deserialize)]
pub struct BridgeResponse {
    pub global: GlobalBlock,
    pub realtime: RealtimeBlock,
    pub legends: LegendsBlock,
}

#[derive(Debug, Deserialize)]
pub struct GlobalBlock {
    pub rank: RankBlock,
}

#[derive(Debug, Deserialize)]
pub struct RankBlock {
    #[serde(rename = "rankScore")]
    pub rank_score: i64,
    #[serde(rename = "rankName")]
    pub rank_name: String,
}

#[derive(Debug, Deserialize)]
pub struct RealtimeBlock {
    // The API reports this as 0/1; accept a plain bool too.
    #[serde(rename = "isOnline", deserialize_with = "bool_from_int")]
    pub is_online: bool,
    #[serde(rename = "currentStateAsText")]
    pub current_state: String,
}

#[derive(Debug, Deserialize)]
pub struct LegendsBlock {
    pub selected: SelectedLegend,
}

#[derive(Debug, Deserialize)]
pub struct SelectedLegend {
    #[serde(rename = "LegendName")]
    pub legend_name: String,
}

fn bool_from_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

/// One observation fetched from the API. Immutable once obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub total_lp: i64,
    pub rank_name: String,
    pub is_online: bool,
    pub state_text: String,
    pub legend_name: String,
}

impl From<BridgeResponse> for Sample {
    fn from(resp: BridgeResponse) -> Self {
        Sample {
            total_lp: resp.global.rank.rank_score,
            rank_name: resp.global.rank.rank_name,
            is_online: resp.realtime.is_online,
            state_text: resp.realtime.current_state,
            legend_name: resp.legends.selected.legend_name,
        }
    }
}
