//! Room directory creation rules and dashboard totals.

use creator_chat_core::{
    DirectoryEvent, InputError, MAX_ANNOUNCEMENT_CHARS, MAX_TITLE_CHARS, MembershipTier,
    Participant, Role, RoomDirectory, RoomError, RoomKind, RoomStatus, SessionConfig, SessionError,
};
use creator_chat_harness::SimEnv;

fn directory() -> RoomDirectory<SimEnv> {
    RoomDirectory::new(SimEnv::with_seed(11), "momorina", SessionConfig::default())
}

#[test]
fn empty_title_defaults_to_channel() {
    let mut dir = directory();
    let id = dir.create_room(RoomKind::General, "   ").unwrap();

    let room = dir.get(id).unwrap();
    assert_eq!(room.title(), "momorina's live chat");
    assert_eq!(room.status(), RoomStatus::Active);
}

#[test]
fn title_length_is_capped() {
    let mut dir = directory();
    let at_limit = "가".repeat(MAX_TITLE_CHARS);
    assert!(dir.create_room(RoomKind::General, &at_limit).is_ok());

    let mut dir = directory();
    let over = "가".repeat(MAX_TITLE_CHARS + 1);
    assert_eq!(
        dir.create_room(RoomKind::General, &over),
        Err(RoomError::TitleTooLong { len: MAX_TITLE_CHARS + 1, max: MAX_TITLE_CHARS })
    );
    assert!(dir.is_empty());
}

#[test]
fn one_creator_only_room_until_ended() {
    let mut dir = directory();
    let first = dir.create_room(RoomKind::CreatorOnly, "announcements").unwrap();

    assert_eq!(dir.create_room(RoomKind::CreatorOnly, "again"), Err(RoomError::CreatorOnlyExists));
    assert!(dir.existing().has_creator_only);

    dir.end_room(first, Role::Creator).unwrap();
    assert!(!dir.existing().has_creator_only);
    assert!(dir.create_room(RoomKind::CreatorOnly, "announcements 2").is_ok());
}

#[test]
fn one_live_general_room() {
    let mut dir = directory();
    let first = dir.create_room(RoomKind::General, "").unwrap();
    assert_eq!(dir.create_room(RoomKind::General, "second"), Err(RoomError::GeneralAlreadyActive));

    // Kinds are independent
    assert!(dir.create_room(RoomKind::CreatorOnly, "").is_ok());

    dir.end_room(first, Role::Moderator).unwrap();
    assert!(dir.create_room(RoomKind::General, "second").is_ok());
    assert_eq!(dir.len(), 3);
}

#[test]
fn fans_cannot_end_rooms() {
    let mut dir = directory();
    let id = dir.create_room(RoomKind::General, "").unwrap();

    let err = dir.end_room(id, Role::Fan).unwrap_err();
    assert!(matches!(err, RoomError::Session(SessionError::Unauthorized { .. })));
    assert_eq!(dir.get(id).unwrap().status(), RoomStatus::Active);
}

#[test]
fn unknown_room_is_reported() {
    let mut dir = directory();
    assert_eq!(dir.end_room(42, Role::Creator), Err(RoomError::RoomNotFound(42)));
    assert!(matches!(dir.close_room(42), Err(RoomError::RoomNotFound(42))));
}

#[test]
fn close_discards_history() {
    let mut dir = directory();
    let id = dir.create_room(RoomKind::General, "").unwrap();
    dir.get_mut(id)
        .unwrap()
        .send_message(&Participant::fan(100, "kane", MembershipTier::Basic), "hello")
        .unwrap();

    let closed = dir.close_room(id).unwrap();
    assert_eq!(closed.messages().len(), 1);
    assert!(dir.get(id).is_none());
    assert!(dir.summaries().is_empty());
}

#[test]
fn summaries_and_totals() {
    let mut dir = directory();
    let general = dir.create_room(RoomKind::General, "Friday stream").unwrap();
    let vip = dir.create_room(RoomKind::CreatorOnly, "").unwrap();

    let fan = Participant::fan(100, "kane", MembershipTier::Vip);
    let room = dir.get_mut(general).unwrap();
    room.update_participants(12).unwrap();
    room.send_message(&fan, "hi").unwrap();
    room.block_user(Role::Creator, fan.id, &fan.name, None).unwrap();

    dir.get_mut(vip).unwrap().update_participants(3).unwrap();
    dir.end_room(vip, Role::Creator).unwrap();

    let summaries = dir.summaries();
    assert_eq!(summaries.iter().map(|s| s.room_id).collect::<Vec<_>>(), [general, vip]);
    assert_eq!(summaries[0].title, "Friday stream");
    assert_eq!(summaries[0].messages, 2);
    assert_eq!(summaries[1].status, RoomStatus::Ended);

    let totals = dir.totals();
    assert_eq!(totals.rooms, 2);
    assert_eq!(totals.live_rooms, 1);
    assert_eq!(totals.participants, 12);
    assert_eq!(totals.total_messages, 2);
    assert_eq!(totals.blocked_users, 1);
}

#[test]
fn tick_reaches_every_room() {
    let env = SimEnv::new();
    let mut dir = RoomDirectory::new(env.clone(), "momorina", SessionConfig::default());
    let a = dir.create_room(RoomKind::General, "").unwrap();
    let b = dir.create_room(RoomKind::CreatorOnly, "").unwrap();

    for id in [a, b] {
        dir.get_mut(id)
            .unwrap()
            .apply_cooldown(Role::Moderator, 100, std::time::Duration::from_secs(5))
            .unwrap();
    }

    env.advance_secs(5);
    assert_eq!(dir.tick(), 2);
    assert_eq!(dir.tick(), 0);
}

#[test]
fn room_summaries_snapshot() {
    let mut dir = directory();
    let id = dir.create_room(RoomKind::General, "").unwrap();
    let summary = dir.summaries().into_iter().find(|s| s.room_id == id).unwrap();

    insta::assert_json_snapshot!(summary, { ".room_id" => "[room_id]" }, @r#"
    {
      "room_id": "[room_id]",
      "kind": "general",
      "title": "momorina's live chat",
      "status": "active",
      "participants": 0,
      "messages": 0
    }
    "#);
}

#[test]
fn announcement_set_replace_and_clear() {
    let mut dir = directory();
    assert_eq!(dir.announcement(), None);

    dir.set_announcement(Role::Creator, "  live at 8pm tonight!  ").unwrap();
    assert_eq!(dir.announcement(), Some("live at 8pm tonight!"));

    dir.set_announcement(Role::Moderator, "moved to 9pm").unwrap();
    assert_eq!(dir.announcement(), Some("moved to 9pm"));

    dir.set_announcement(Role::Creator, "   ").unwrap();
    assert_eq!(dir.announcement(), None);

    dir.set_announcement(Role::Creator, "back again").unwrap();
    dir.clear_announcement(Role::Moderator).unwrap();
    assert_eq!(dir.announcement(), None);

    let text = |t: &str| DirectoryEvent::AnnouncementChanged { text: Some(t.to_string()) };
    assert_eq!(
        dir.take_events(),
        vec![
            text("live at 8pm tonight!"),
            text("moved to 9pm"),
            DirectoryEvent::AnnouncementChanged { text: None },
            text("back again"),
            DirectoryEvent::AnnouncementChanged { text: None },
        ]
    );
    assert!(dir.take_events().is_empty());
}

#[test]
fn announcement_rejects_fans_and_long_text() {
    let mut dir = directory();
    dir.set_announcement(Role::Creator, "keep me").unwrap();
    let _ = dir.take_events();

    assert!(matches!(
        dir.set_announcement(Role::Fan, "hijack"),
        Err(RoomError::Session(SessionError::Unauthorized { .. }))
    ));
    assert!(matches!(dir.clear_announcement(Role::Fan), Err(RoomError::Session(_))));

    let long = "가".repeat(MAX_ANNOUNCEMENT_CHARS + 1);
    assert_eq!(
        dir.set_announcement(Role::Creator, &long),
        Err(RoomError::Session(SessionError::InvalidInput(InputError::TooLong {
            len: MAX_ANNOUNCEMENT_CHARS + 1,
            max: MAX_ANNOUNCEMENT_CHARS,
        })))
    );

    assert_eq!(dir.announcement(), Some("keep me"));
    assert!(dir.take_events().is_empty());
}

#[test]
fn banned_words_trim_and_dedup() {
    let mut dir = directory();

    assert_eq!(dir.add_banned_word(Role::Creator, " spam "), Ok(true));
    assert_eq!(dir.add_banned_word(Role::Moderator, "spam"), Ok(false));
    assert_eq!(dir.add_banned_word(Role::Creator, "ads"), Ok(true));
    assert_eq!(
        dir.add_banned_word(Role::Creator, "   "),
        Err(RoomError::Session(SessionError::InvalidInput(InputError::Empty)))
    );
    assert!(matches!(dir.add_banned_word(Role::Fan, "mods"), Err(RoomError::Session(_))));
    assert_eq!(dir.banned_words(), ["spam", "ads"]);

    assert_eq!(dir.remove_banned_word(Role::Moderator, "spam"), Ok(true));
    assert_eq!(dir.remove_banned_word(Role::Moderator, "spam"), Ok(false));
    assert_eq!(dir.banned_words(), ["ads"]);

    assert_eq!(
        dir.take_events(),
        vec![
            DirectoryEvent::BannedWordAdded { word: "spam".to_string() },
            DirectoryEvent::BannedWordAdded { word: "ads".to_string() },
            DirectoryEvent::BannedWordRemoved { word: "spam".to_string() },
        ]
    );
}

#[test]
fn banned_words_do_not_filter_messages() {
    let mut dir = directory();
    dir.add_banned_word(Role::Creator, "spam").unwrap();
    let id = dir.create_room(RoomKind::General, "").unwrap();
    let fan = Participant::fan(100, "kane", MembershipTier::Basic);

    let room = dir.get_mut(id).unwrap();
    let msg = room.send_message(&fan, "no spam here").unwrap();
    assert_eq!(room.messages().get(msg).unwrap().content(), "no spam here");
}

#[test]
fn channel_overview_snapshot() {
    let mut dir = directory();
    dir.create_room(RoomKind::General, "").unwrap();
    dir.set_announcement(Role::Creator, "live at 8pm tonight!").unwrap();
    dir.add_banned_word(Role::Moderator, "spam").unwrap();

    insta::assert_json_snapshot!(dir.overview(), { ".rooms[].room_id" => "[room_id]" }, @r#"
    {
      "channel": "momorina",
      "announcement": "live at 8pm tonight!",
      "banned_words": [
        "spam"
      ],
      "rooms": [
        {
          "room_id": "[room_id]",
          "kind": "general",
          "title": "momorina's live chat",
          "status": "active",
          "participants": 0,
          "messages": 0
        }
      ],
      "totals": {
        "rooms": 1,
        "live_rooms": 1,
        "participants": 0,
        "total_messages": 0,
        "blocked_users": 0
      }
    }
    "#);
}
