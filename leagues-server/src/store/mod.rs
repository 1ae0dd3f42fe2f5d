pub mod users;

use futures::TryStreamExt;
use leagues_api::games::{Game, PartialGame};
use leagues_api::id::{GameId, LeagueId, MatchId, PlayerId, TeamId};
use leagues_api::leagues::{League, PartialLeague};
use leagues_api::matches::{Match, PartialMatch};
use leagues_api::players::{PartialPlayer, Player};
use leagues_api::teams::{PartialTeam, Team};
use sqlx::mysql::MySqlPool;
use sqlx::Row;

use crate::Error;

/// Builds an `UPDATE` statement covering exactly `columns`, keyed on
/// `key`. Values are bound positionally in column order with the row key
/// bound last.
///
/// Column names are static per entity and never derived from caller input.
/// The caller must reject empty updates before calling this.
fn build_update(table: &str, columns: &[&str], key: &str) -> String {
    debug_assert!(!columns.is_empty());

    let set = columns
        .iter()
        .map(|col| format!("{} = ?", col))
        .collect::<Vec<String>>()
        .join(", ");

    format!("UPDATE {} SET {} WHERE {} = ?", table, set, key)
}

macro_rules! get_one {
    ($query:expr) => {
        match $query {
            Ok(v) => v,
            Err(sqlx::Error::RowNotFound) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    };
}

#[derive(Clone, Debug)]
pub struct Store {
    pub pool: MySqlPool,
    pub table_prefix: String,
}

impl Store {
    #[inline]
    pub fn players(&self) -> PlayersClient<'_> {
        PlayersClient { store: self }
    }

    #[inline]
    pub fn games(&self) -> GamesClient<'_> {
        GamesClient { store: self }
    }

    #[inline]
    pub fn teams(&self) -> TeamsClient<'_> {
        TeamsClient { store: self }
    }

    #[inline]
    pub fn matches(&self) -> MatchesClient<'_> {
        MatchesClient { store: self }
    }

    #[inline]
    pub fn leagues(&self) -> LeaguesClient<'_> {
        LeaguesClient { store: self }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct PlayersClient<'a> {
    store: &'a Store,
}

impl<'a> PlayersClient<'a> {
    /// Returns all [`Player`]s.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if a database error occured.
    pub async fn list(&self) -> Result<Vec<Player>, Error> {
        let sql = format!(
            "SELECT player_id, first_name, last_name, gender, address FROM {}players",
            self.store.table_prefix
        );

        let mut rows = sqlx::query(&sql).fetch(&self.store.pool);

        let mut players = Vec::new();
        while let Some(row) = rows.try_next().await? {
            players.push(Player {
                id: PlayerId(row.try_get("player_id")?),
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                gender: row.try_get("gender")?,
                address: row.try_get("address")?,
            });
        }

        Ok(players)
    }

    /// Returns the [`Player`] with the given `id`. Returns `None` if no
    /// player with the given `id` exists.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if a database error occured.
    pub async fn get(&self, id: PlayerId) -> Result<Option<Player>, Error> {
        let row = get_one!(
            sqlx::query(&format!(
                "SELECT first_name, last_name, gender, address FROM {}players WHERE player_id = ?",
                self.store.table_prefix
            ))
            .bind(id.0)
            .fetch_one(&self.store.pool)
            .await
        );

        Ok(Some(Player {
            id,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            gender: row.try_get("gender")?,
            address: row.try_get("address")?,
        }))
    }

    /// Inserts a new [`Player`] and returns the [`PlayerId`] assigned by the
    /// store.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if a database error occured.
    pub async fn insert(&self, player: &Player) -> Result<PlayerId, Error> {
        let res = sqlx::query(&format!(
            "INSERT INTO {}players (first_name, last_name, gender, address) VALUES (?, ?, ?, ?)",
            self.store.table_prefix
        ))
        .bind(&player.first_name)
        .bind(&player.last_name)
        .bind(&player.gender)
        .bind(&player.address)
        .execute(&self.store.pool)
        .await?;

        Ok(PlayerId(res.last_insert_id()))
    }

    /// Updates the supplied fields of the [`Player`] with the given `id`
    /// using a single statement. Returns the number of rows matched.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if a database error occured.
    pub async fn update(&self, id: PlayerId, player: &PartialPlayer) -> Result<u64, Error> {
        let mut columns = Vec::new();
        if player.first_name.is_some() {
            columns.push("first_name");
        }
        if player.last_name.is_some() {
            columns.push("last_name");
        }
        if player.gender.is_some() {
            columns.push("gender");
        }
        if player.address.is_some() {
            columns.push("address");
        }

        let sql = build_update(
            &format!("{}players", self.store.table_prefix),
            &columns,
            "player_id",
        );

        let mut query = sqlx::query(&sql);
        if let Some(first_name) = &player.first_name {
            query = query.bind(first_name);
        }
        if let Some(last_name) = &player.last_name {
            query = query.bind(last_name);
        }
        if let Some(gender) = &player.gender {
            query = query.bind(gender);
        }
        if let Some(address) = &player.address {
            query = query.bind(address);
        }
        query = query.bind(id.0);

        let res = query.execute(&self.store.pool).await?;

        Ok(res.rows_affected())
    }

    /// Deletes the [`Player`] with the given `id`. Returns the number of
    /// rows removed.
    ///
    /// # Errors
    ///
    /// Returns an [`enum@Error`] if a database error occured.
    pub async fn delete(&self, id: PlayerId) -> Result<u64, Error> {
        let res = sqlx::query(&format!(
            "DELETE FROM {}players WHERE player_id = ?",
            self.store.table_prefix
        ))
        .bind(id.0)
        .execute(&self.store.pool)
        .await?;

        Ok(res.rows_affected())
    }
}

#[derive(Copy, Clone, Debug)]
pub struct GamesClient<'a> {
    store: &'a Store,
}

impl<'a> GamesClient<'a> {
    pub async fn list(&self) -> Result<Vec<Game>, Error> {
        let sql = format!(
            "SELECT game_code, game_name, game_description FROM {}games",
            self.store.table_prefix
        );

        let mut rows = sqlx::query(&sql).fetch(&self.store.pool);

        let mut games = Vec::new();
        while let Some(row) = rows.try_next().await? {
            games.push(Game {
                code: GameId(row.try_get("game_code")?),
                name: row.try_get("game_name")?,
                description: row.try_get("game_description")?,
            });
        }

        Ok(games)
    }

    pub async fn get(&self, code: GameId) -> Result<Option<Game>, Error> {
        let row = get_one!(
            sqlx::query(&format!(
                "SELECT game_name, game_description FROM {}games WHERE game_code = ?",
                self.store.table_prefix
            ))
            .bind(code.0)
            .fetch_one(&self.store.pool)
            .await
        );

        Ok(Some(Game {
            code,
            name: row.try_get("game_name")?,
            description: row.try_get("game_description")?,
        }))
    }

    pub async fn insert(&self, game: &Game) -> Result<GameId, Error> {
        let res = sqlx::query(&format!(
            "INSERT INTO {}games (game_name, game_description) VALUES (?, ?)",
            self.store.table_prefix
        ))
        .bind(&game.name)
        .bind(&game.description)
        .execute(&self.store.pool)
        .await?;

        Ok(GameId(res.last_insert_id()))
    }

    pub async fn update(&self, code: GameId, game: &PartialGame) -> Result<u64, Error> {
        let mut columns = Vec::new();
        if game.name.is_some() {
            columns.push("game_name");
        }
        if game.description.is_some() {
            columns.push("game_description");
        }

        let sql = build_update(
            &format!("{}games", self.store.table_prefix),
            &columns,
            "game_code",
        );

        let mut query = sqlx::query(&sql);
        if let Some(name) = &game.name {
            query = query.bind(name);
        }
        if let Some(description) = &game.description {
            query = query.bind(description);
        }
        query = query.bind(code.0);

        let res = query.execute(&self.store.pool).await?;

        Ok(res.rows_affected())
    }

    pub async fn delete(&self, code: GameId) -> Result<u64, Error> {
        let res = sqlx::query(&format!(
            "DELETE FROM {}games WHERE game_code = ?",
            self.store.table_prefix
        ))
        .bind(code.0)
        .execute(&self.store.pool)
        .await?;

        Ok(res.rows_affected())
    }
}

#[derive(Copy, Clone, Debug)]
pub struct TeamsClient<'a> {
    store: &'a Store,
}

impl<'a> TeamsClient<'a> {
    pub async fn list(&self) -> Result<Vec<Team>, Error> {
        let sql = format!(
            "SELECT team_id, team_name, created_by_player_id, date_created FROM {}teams",
            self.store.table_prefix
        );

        let mut rows = sqlx::query(&sql).fetch(&self.store.pool);

        let mut teams = Vec::new();
        while let Some(row) = rows.try_next().await? {
            teams.push(Team {
                id: TeamId(row.try_get("team_id")?),
                name: row.try_get("team_name")?,
                created_by: PlayerId(row.try_get("created_by_player_id")?),
                date_created: row.try_get("date_created")?,
            });
        }

        Ok(teams)
    }

    pub async fn get(&self, id: TeamId) -> Result<Option<Team>, Error> {
        let row = get_one!(
            sqlx::query(&format!(
                "SELECT team_name, created_by_player_id, date_created FROM {}teams WHERE team_id = ?",
                self.store.table_prefix
            ))
            .bind(id.0)
            .fetch_one(&self.store.pool)
            .await
        );

        Ok(Some(Team {
            id,
            name: row.try_get("team_name")?,
            created_by: PlayerId(row.try_get("created_by_player_id")?),
            date_created: row.try_get("date_created")?,
        }))
    }

    pub async fn insert(&self, team: &Team) -> Result<TeamId, Error> {
        let res = sqlx::query(&format!(
            "INSERT INTO {}teams (team_name, created_by_player_id, date_created) VALUES (?, ?, ?)",
            self.store.table_prefix
        ))
        .bind(&team.name)
        .bind(team.created_by.0)
        .bind(team.date_created)
        .execute(&self.store.pool)
        .await?;

        Ok(TeamId(res.last_insert_id()))
    }

    pub async fn update(&self, id: TeamId, team: &PartialTeam) -> Result<u64, Error> {
        let mut columns = Vec::new();
        if team.name.is_some() {
            columns.push("team_name");
        }
        if team.created_by.is_some() {
            columns.push("created_by_player_id");
        }
        if team.date_created.is_some() {
            columns.push("date_created");
        }

        let sql = build_update(
            &format!("{}teams", self.store.table_prefix),
            &columns,
            "team_id",
        );

        let mut query = sqlx::query(&sql);
        if let Some(name) = &team.name {
            query = query.bind(name);
        }
        if let Some(created_by) = team.created_by {
            query = query.bind(created_by.0);
        }
        if let Some(date_created) = team.date_created {
            query = query.bind(date_created);
        }
        query = query.bind(id.0);

        let res = query.execute(&self.store.pool).await?;

        Ok(res.rows_affected())
    }

    pub async fn delete(&self, id: TeamId) -> Result<u64, Error> {
        let res = sqlx::query(&format!(
            "DELETE FROM {}teams WHERE team_id = ?",
            self.store.table_prefix
        ))
        .bind(id.0)
        .execute(&self.store.pool)
        .await?;

        Ok(res.rows_affected())
    }
}

#[derive(Copy, Clone, Debug)]
pub struct MatchesClient<'a> {
    store: &'a Store,
}

impl<'a> MatchesClient<'a> {
    pub async fn list(&self) -> Result<Vec<Match>, Error> {
        let sql = format!(
            "SELECT match_id, game_code, team_1_id, team_2_id, match_date, result FROM {}matches",
            self.store.table_prefix
        );

        let mut rows = sqlx::query(&sql).fetch(&self.store.pool);

        let mut matches = Vec::new();
        while let Some(row) = rows.try_next().await? {
            matches.push(Match {
                id: MatchId(row.try_get("match_id")?),
                game: GameId(row.try_get("game_code")?),
                team_1: TeamId(row.try_get("team_1_id")?),
                team_2: TeamId(row.try_get("team_2_id")?),
                match_date: row.try_get("match_date")?,
                result: row.try_get("result")?,
            });
        }

        Ok(matches)
    }

    pub async fn get(&self, id: MatchId) -> Result<Option<Match>, Error> {
        let row = get_one!(
            sqlx::query(&format!(
                "SELECT game_code, team_1_id, team_2_id, match_date, result FROM {}matches WHERE match_id = ?",
                self.store.table_prefix
            ))
            .bind(id.0)
            .fetch_one(&self.store.pool)
            .await
        );

        Ok(Some(Match {
            id,
            game: GameId(row.try_get("game_code")?),
            team_1: TeamId(row.try_get("team_1_id")?),
            team_2: TeamId(row.try_get("team_2_id")?),
            match_date: row.try_get("match_date")?,
            result: row.try_get("result")?,
        }))
    }

    pub async fn insert(&self, m: &Match) -> Result<MatchId, Error> {
        let res = sqlx::query(&format!(
            "INSERT INTO {}matches (game_code, team_1_id, team_2_id, match_date, result) VALUES (?, ?, ?, ?, ?)",
            self.store.table_prefix
        ))
        .bind(m.game.0)
        .bind(m.team_1.0)
        .bind(m.team_2.0)
        .bind(m.match_date)
        .bind(&m.result)
        .execute(&self.store.pool)
        .await?;

        Ok(MatchId(res.last_insert_id()))
    }

    pub async fn update(&self, id: MatchId, m: &PartialMatch) -> Result<u64, Error> {
        let mut columns = Vec::new();
        if m.game.is_some() {
            columns.push("game_code");
        }
        if m.team_1.is_some() {
            columns.push("team_1_id");
        }
        if m.team_2.is_some() {
            columns.push("team_2_id");
        }
        if m.match_date.is_some() {
            columns.push("match_date");
        }
        if m.result.is_some() {
            columns.push("result");
        }

        let sql = build_update(
            &format!("{}matches", self.store.table_prefix),
            &columns,
            "match_id",
        );

        let mut query = sqlx::query(&sql);
        if let Some(game) = m.game {
            query = query.bind(game.0);
        }
        if let Some(team_1) = m.team_1 {
            query = query.bind(team_1.0);
        }
        if let Some(team_2) = m.team_2 {
            query = query.bind(team_2.0);
        }
        if let Some(match_date) = m.match_date {
            query = query.bind(match_date);
        }
        if let Some(result) = &m.result {
            query = query.bind(result);
        }
        query = query.bind(id.0);

        let res = query.execute(&self.store.pool).await?;

        Ok(res.rows_affected())
    }

    pub async fn delete(&self, id: MatchId) -> Result<u64, Error> {
        let res = sqlx::query(&format!(
            "DELETE FROM {}matches WHERE match_id = ?",
            self.store.table_prefix
        ))
        .bind(id.0)
        .execute(&self.store.pool)
        .await?;

        Ok(res.rows_affected())
    }
}

#[derive(Copy, Clone, Debug)]
pub struct LeaguesClient<'a> {
    store: &'a Store,
}

impl<'a> LeaguesClient<'a> {
    pub async fn list(&self) -> Result<Vec<League>, Error> {
        let sql = format!(
            "SELECT league_id, league_name, country FROM {}leagues",
            self.store.table_prefix
        );

        let mut rows = sqlx::query(&sql).fetch(&self.store.pool);

        let mut leagues = Vec::new();
        while let Some(row) = rows.try_next().await? {
            leagues.push(League {
                id: LeagueId(row.try_get("league_id")?),
                name: row.try_get("league_name")?,
                country: row.try_get("country")?,
            });
        }

        Ok(leagues)
    }

    pub async fn get(&self, id: LeagueId) -> Result<Option<League>, Error> {
        let row = get_one!(
            sqlx::query(&format!(
                "SELECT league_name, country FROM {}leagues WHERE league_id = ?",
                self.store.table_prefix
            ))
            .bind(id.0)
            .fetch_one(&self.store.pool)
            .await
        );

        Ok(Some(League {
            id,
            name: row.try_get("league_name")?,
            country: row.try_get("country")?,
        }))
    }

    pub async fn insert(&self, league: &League) -> Result<LeagueId, Error> {
        let res = sqlx::query(&format!(
            "INSERT INTO {}leagues (league_name, country) VALUES (?, ?)",
            self.store.table_prefix
        ))
        .bind(&league.name)
        .bind(&league.country)
        .execute(&self.store.pool)
        .await?;

        Ok(LeagueId(res.last_insert_id()))
    }

    pub async fn update(&self, id: LeagueId, league: &PartialLeague) -> Result<u64, Error> {
        let mut columns = Vec::new();
        if league.name.is_some() {
            columns.push("league_name");
        }
        if league.country.is_some() {
            columns.push("country");
        }

        let sql = build_update(
            &format!("{}leagues", self.store.table_prefix),
            &columns,
            "league_id",
        );

        let mut query = sqlx::query(&sql);
        if let Some(name) = &league.name {
            query = query.bind(name);
        }
        if let Some(country) = &league.country {
            query = query.bind(country);
        }
        query = query.bind(id.0);

        let res = query.execute(&self.store.pool).await?;

        Ok(res.rows_affected())
    }

    pub async fn delete(&self, id: LeagueId) -> Result<u64, Error> {
        let res = sqlx::query(&format!(
            "DELETE FROM {}leagues WHERE league_id = ?",
            self.store.table_prefix
        ))
        .bind(id.0)
        .execute(&self.store.pool)
        .await?;

        Ok(res.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::build_update;

    #[test]
    fn test_build_update() {
        assert_eq!(
            build_update("players", &["first_name"], "player_id"),
            "UPDATE players SET first_name = ? WHERE player_id = ?"
        );

        assert_eq!(
            build_update("players", &["first_name", "address"], "player_id"),
            "UPDATE players SET first_name = ?, address = ? WHERE player_id = ?"
        );

        assert_eq!(
            build_update("lg_matches", &["team_1_id", "team_2_id", "result"], "match_id"),
            "UPDATE lg_matches SET team_1_id = ?, team_2_id = ?, result = ? WHERE match_id = ?"
        );
    }
}
