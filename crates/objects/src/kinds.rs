//! Concrete object kinds and the tagged union over them.
//!
//! In YAML each object is written as a tagged mapping, `!Room` followed by
//! its fields. The tag is the variant name; nothing outside [`ObjectKind::ALL`]
//! can be decoded into a [`StoredObject`].

use crate::types::{Identified, ObjectId, ParseKindError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A location objects can be placed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ObjectId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exits: Vec<ObjectId>,
}

/// A one-way link from the room it sits in to another room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exit {
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_room: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    /// Password digest. Never the clear text.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub passwd: String,
    #[serde(default)]
    pub color: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ObjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
}

/// Non-player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub id: ObjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub desc: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ObjectId>,
}

/// A verb players can type, with its help text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: ObjectId,
    pub name: String,
    pub cmd: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
}

/// Every object the store can hold.
///
/// Serde's externally tagged representation maps each variant onto a YAML
/// tag, so the variant list doubles as the decode allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoredObject {
    Exit(Exit),
    Room(Room),
    Player(Player),
    Item(Item),
    #[serde(rename = "NPC")]
    Npc(Npc),
    Command(Command),
}

impl StoredObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Exit(_) => ObjectKind::Exit,
            Self::Room(_) => ObjectKind::Room,
            Self::Player(_) => ObjectKind::Player,
            Self::Item(_) => ObjectKind::Item,
            Self::Npc(_) => ObjectKind::Npc,
            Self::Command(_) => ObjectKind::Command,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Exit(o) => &o.name,
            Self::Room(o) => &o.name,
            Self::Player(o) => &o.name,
            Self::Item(o) => &o.name,
            Self::Npc(o) => &o.name,
            Self::Command(o) => &o.name,
        }
    }
}

macro_rules! impl_identified {
    ($($kind:ident),*) => {
        $(
            impl Identified for $kind {
                fn id(&self) -> ObjectId {
                    self.id
                }
            }

            impl From<$kind> for StoredObject {
                fn from(obj: $kind) -> Self {
                    Self::$kind(obj)
                }
            }
        )*
    };
}

impl_identified!(Exit, Room, Player, Item, Npc, Command);

impl Identified for StoredObject {
    fn id(&self) -> ObjectId {
        match self {
            Self::Exit(o) => o.id(),
            Self::Room(o) => o.id(),
            Self::Player(o) => o.id(),
            Self::Item(o) => o.id(),
            Self::Npc(o) => o.id(),
            Self::Command(o) => o.id(),
        }
    }
}

/// Discriminant of [`StoredObject`], one per permitted YAML tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Exit,
    Room,
    Player,
    Item,
    Npc,
    Command,
}

impl ObjectKind {
    /// The full allow-list, in declaration order.
    pub const ALL: [ObjectKind; 6] = [
        Self::Exit,
        Self::Room,
        Self::Player,
        Self::Item,
        Self::Npc,
        Self::Command,
    ];

    /// The YAML tag (without the leading `!`) for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Exit => "Exit",
            Self::Room => "Room",
            Self::Player => "Player",
            Self::Item => "Item",
            Self::Npc => "NPC",
            Self::Command => "Command",
        }
    }

    /// Look up a kind by its exact tag. Matching is case-sensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ObjectKind {
    type Err = ParseKindError;

    /// Lenient parse for user input: ignores case and a leading `!`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.strip_prefix('!').unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: u64) -> Room {
        Room {
            id: ObjectId(id),
            name: "Hall".into(),
            owner: Some(ObjectId(1)),
            desc: "A long hall.".into(),
            contents: vec![ObjectId(3)],
            exits: vec![ObjectId(4)],
        }
    }

    #[test]
    fn allow_list_tags_resolve() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ObjectKind::from_tag("NPC"), Some(ObjectKind::Npc));
    }

    #[test]
    fn foreign_tags_are_not_kinds() {
        assert_eq!(ObjectKind::from_tag("Unknown"), None);
        assert_eq!(ObjectKind::from_tag("ruby/object:Room"), None);
        assert_eq!(ObjectKind::from_tag("room"), None);
        assert_eq!(ObjectKind::from_tag("Npc"), None);
    }

    #[test]
    fn parse_kind_is_lenient() {
        assert_eq!("npc".parse::<ObjectKind>(), Ok(ObjectKind::Npc));
        assert_eq!("!Room".parse::<ObjectKind>(), Ok(ObjectKind::Room));
        assert_eq!(
            "Dragon".parse::<ObjectKind>(),
            Err(ParseKindError("Dragon".into()))
        );
    }

    #[test]
    fn identified_across_variants() {
        let objects: Vec<StoredObject> = vec![
            room(2).into(),
            Command {
                id: ObjectId(9),
                name: "look".into(),
                cmd: "cmd_look".into(),
                help: String::new(),
            }
            .into(),
        ];
        let ids: Vec<_> = objects.iter().map(Identified::id).collect();
        assert_eq!(ids, vec![ObjectId(2), ObjectId(9)]);
        assert_eq!(objects[0].kind(), ObjectKind::Room);
        assert_eq!(objects[1].name(), "look");
    }

    #[test]
    fn yaml_uses_kind_as_tag() {
        let obj = StoredObject::from(room(2));
        let yaml = serde_yaml::to_string(&obj).unwrap();
        assert!(yaml.starts_with("!Room"), "got: {yaml}");

        let back: StoredObject = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, obj);
    }

    #[test]
    fn npc_tag_is_upper_case() {
        let obj = StoredObject::Npc(Npc {
            id: ObjectId(5),
            name: "guard".into(),
            owner: None,
            location: Some(ObjectId(0)),
            desc: String::new(),
            contents: Vec::new(),
        });
        let yaml = serde_yaml::to_string(&obj).unwrap();
        assert!(yaml.starts_with("!NPC"), "got: {yaml}");
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let obj: StoredObject = serde_yaml::from_str("!Item\nid: 3\nname: lamp\n").unwrap();
        assert_eq!(
            obj,
            StoredObject::Item(Item {
                id: ObjectId(3),
                name: "lamp".into(),
                owner: None,
                location: None,
                desc: String::new(),
            })
        );
    }
}
