use crate::battle::state::{Battle, BattleKind, BattleStatus, PvpFormat, Room};
use crate::battle::state::PlayerSide;
use crate::battle::tests::common::{blue, red, TestWorld};
use crate::errors::{EngineError, RoomError};
use crate::rng::TurnRng;
use crate::rooms::ROOM_TTL;
use crate::snapshot::CombatantSnapshot;
use pretty_assertions::assert_eq;
use schema::SpeciesId;
use std::time::{Duration, Instant};

#[test]
fn the_lobby_lists_public_rooms_only() {
    let tw = TestWorld::new();
    let service = tw.service();
    tw.add_team_member(&red(), SpeciesId(25), 10);
    tw.add_team_member(&blue(), SpeciesId(1), 10);

    let (_, public_code) = service
        .create_room(&red(), PvpFormat::OneVsOne, false, None)
        .unwrap();
    service
        .create_room(&blue(), PvpFormat::OneVsOne, true, Some("hunter2".into()))
        .unwrap();

    let rooms = service.open_rooms();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].code, public_code);
    assert_eq!(rooms[0].host, red());
    assert!(!rooms[0].has_password);
}

#[test]
fn room_codes_have_the_lobby_shape() {
    let tw = TestWorld::new();
    let service = tw.service();
    tw.add_team_member(&red(), SpeciesId(25), 10);

    let (_, code) = service
        .create_room(&red(), PvpFormat::OneVsOne, false, None)
        .unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[test]
fn password_rooms_check_the_password() {
    let tw = TestWorld::new();
    let service = tw.service();
    tw.add_team_member(&red(), SpeciesId(25), 10);
    tw.add_team_member(&blue(), SpeciesId(1), 10);

    let (_, code) = service
        .create_room(&red(), PvpFormat::OneVsOne, false, Some("hunter2".into()))
        .unwrap();

    let err = service
        .join_room_with_rng(&blue(), &code, None, &mut TurnRng::new_for_test(vec![]))
        .unwrap_err();
    assert_eq!(err, EngineError::Room(RoomError::WrongPassword));

    service
        .join_room_with_rng(
            &blue(),
            &code,
            Some("hunter2"),
            &mut TurnRng::new_for_test(vec![]),
        )
        .unwrap();
}

#[test]
fn hosts_cannot_join_their_own_room() {
    let tw = TestWorld::new();
    let service = tw.service();
    tw.add_team_member(&red(), SpeciesId(25), 10);

    let (_, code) = service
        .create_room(&red(), PvpFormat::OneVsOne, false, None)
        .unwrap();
    let err = service
        .join_room_with_rng(&red(), &code, None, &mut TurnRng::new_for_test(vec![]))
        .unwrap_err();
    assert_eq!(err, EngineError::Room(RoomError::SelfJoin));
}

#[test]
fn joining_an_unknown_code_fails() {
    let tw = TestWorld::new();
    let service = tw.service();
    tw.add_team_member(&blue(), SpeciesId(1), 10);

    let err = service
        .join_room_with_rng(&blue(), "NOSUCH", None, &mut TurnRng::new_for_test(vec![]))
        .unwrap_err();
    assert_eq!(err, EngineError::Room(RoomError::RoomNotFound));
}

#[test]
fn two_on_two_needs_two_able_pokemon() {
    let tw = TestWorld::new();
    let service = tw.service();
    tw.add_team_member(&red(), SpeciesId(25), 10);

    let err = service
        .create_room(&red(), PvpFormat::TwoVsTwo, false, None)
        .unwrap_err();
    assert_eq!(err, EngineError::Room(RoomError::NotEnoughPokemon(2)));
}

#[test]
fn a_speed_tie_is_settled_by_coin_flip() {
    let tw = TestWorld::new();
    let service = tw.service();
    tw.add_team_member(&red(), SpeciesId(25), 10);
    tw.add_team_member(&blue(), SpeciesId(25), 40);

    let (id, code) = service
        .create_room(&red(), PvpFormat::OneVsOne, false, None)
        .unwrap();
    // Identical species at level 50 tie on speed; a high roll favors the
    // joiner.
    service
        .join_room_with_rng(&blue(), &code, None, &mut TurnRng::new_for_test(vec![100]))
        .unwrap();

    assert!(service.view(id, &blue()).unwrap().your_turn);
    assert!(!service.view(id, &red()).unwrap().your_turn);
}

#[test]
fn stale_rooms_expire_into_draws() {
    let tw = TestWorld::new();
    let service = tw.service();
    tw.add_team_member(&blue(), SpeciesId(1), 10);

    let host = CombatantSnapshot::from_species(&tw.world.dex, SpeciesId(25), 50).unwrap();
    let mut battle = Battle::new(BattleKind::Pvp {
        room: Room {
            code: "OLDONE".into(),
            is_private: false,
            password: None,
            created_at: Instant::now()
                .checked_sub(ROOM_TTL + Duration::from_secs(1))
                .unwrap(),
        },
        sides: vec![PlayerSide::new(red(), vec![host])],
        current_turn: 0,
        format: PvpFormat::OneVsOne,
    });
    battle.status = BattleStatus::Waiting;
    let id = service.insert(battle);

    let err = service
        .join_room_with_rng(&blue(), "OLDONE", None, &mut TurnRng::new_for_test(vec![]))
        .unwrap_err();
    assert_eq!(err, EngineError::Room(RoomError::RoomExpired));
    assert_eq!(service.view(id, &red()).unwrap().status, BattleStatus::Draw);
    assert!(service.open_rooms().is_empty());
}
