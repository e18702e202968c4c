use super::Database;

impl Database {
    /// Applies the outcome of a PvP battle: loser HP, win/loss tallies, and
    /// a history row.
    #[allow(clippy::too_many_arguments)]
    pub fn record_pvp_battle(
        &self,
        attacker_id: &str,
        defender_id: &str,
        winner_id: &str,
        loser_id: &str,
        loser_hp: i64,
        attacker_power: i64,
        defender_power: i64,
    ) -> anyhow::Result<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE users SET hp = ?1 WHERE user_id = ?2",
            (loser_hp, loser_id),
        )?;
        conn.execute(
            "UPDATE users SET pvp_wins = pvp_wins + 1 WHERE user_id = ?1",
            [winner_id],
        )?;
        conn.execute(
            "UPDATE users SET pvp_losses = pvp_losses + 1 WHERE user_id = ?1",
            [loser_id],
        )?;
        conn.execute(
            "INSERT INTO pvp (attacker_id, defender_id, winner_id, attacker_power, defender_power)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                attacker_id,
                defender_id,
                winner_id,
                attacker_power,
                defender_power,
            ),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::test_db;

    #[test]
    fn test_record_battle_updates_both_sides() {
        let db = test_db();
        db.ensure_user("1", "alice").unwrap();
        db.ensure_user("2", "bob").unwrap();

        db.record_pvp_battle("1", "2", "1", "2", 80, 130, 110).unwrap();

        let winner = db.get_user("1").unwrap().unwrap();
        let loser = db.get_user("2").unwrap().unwrap();
        assert_eq!(winner.pvp_wins, 1);
        assert_eq!(winner.pvp_losses, 0);
        assert_eq!(loser.pvp_losses, 1);
        assert_eq!(loser.hp, 80);
        assert_eq!(winner.win_rate(), 100.0);

        let conn = db.lock();
        let battles: i64 = conn
            .query_row("SELECT COUNT(*) FROM pvp", [], |row| row.get(0))
            .unwrap();
        assert_eq!(battles, 1);
    }
}
