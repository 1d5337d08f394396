//! Game entities returned by the stored procedures.

use crate::db::Value;
use crate::mapping::{assign, Assign, MapRow};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Player {
    pub player_id: Uuid,
    pub player_name: String,
    pub full_name: String,
    /// Stored as text by the schema.
    pub age: String,
    pub level: i32,
    pub email: String,
    pub created_date: NaiveDateTime,
}

impl MapRow for Player {
    fn assign(&mut self, column: &str, value: &Value) -> Assign {
        match column {
            "PlayerId" => assign(&mut self.player_id, value),
            "PlayerName" => assign(&mut self.player_name, value),
            "FullName" => assign(&mut self.full_name, value),
            "Age" => assign(&mut self.age, value),
            "Level" => assign(&mut self.level, value),
            "Email" => assign(&mut self.email, value),
            "CreatedDate" => assign(&mut self.created_date, value),
            _ => Assign::Unmatched,
        }
    }
}

/// A game asset (hero, equipment, etc.).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Asset {
    pub asset_id: Uuid,
    pub asset_name: String,
    pub level_require: i32,
    pub created_date: NaiveDateTime,
}

impl MapRow for Asset {
    fn assign(&mut self, column: &str, value: &Value) -> Assign {
        match column {
            "AssetId" => assign(&mut self.asset_id, value),
            "AssetName" => assign(&mut self.asset_name, value),
            "LevelRequire" => assign(&mut self.level_require, value),
            "CreatedDate" => assign(&mut self.created_date, value),
            _ => Assign::Unmatched,
        }
    }
}

/// One line of the player assets report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayerAssetReport {
    pub no: i32,
    pub player_name: String,
    pub level: i32,
    pub age: String,
    pub asset_name: String,
}

impl MapRow for PlayerAssetReport {
    // sp_GetAssetsByPlayer aliases its columns for display.
    fn assign(&mut self, column: &str, value: &Value) -> Assign {
        match column {
            "No" => assign(&mut self.no, value),
            "Player name" => assign(&mut self.player_name, value),
            "Level" => assign(&mut self.level, value),
            "Age" => assign(&mut self.age, value),
            "Asset name" => assign(&mut self.asset_name, value),
            _ => Assign::Unmatched,
        }
    }
}
