//! Scene and room command lists.

use otrkit_common::BinaryReader;

use crate::{DecodeError, Result};

/// An actor placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActorEntry {
    pub id: u16,
    pub position: [i16; 3],
    pub rotation: [i16; 3],
    pub params: u16,
}

impl ActorEntry {
    fn read(reader: &mut BinaryReader<'_>) -> otrkit_common::Result<Self> {
        Ok(Self {
            id: reader.read_u16()?,
            position: reader.read_vec3s()?,
            rotation: reader.read_vec3s()?,
            params: reader.read_u16()?,
        })
    }
}

/// An actor that connects two rooms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionActorEntry {
    pub front: [u8; 2],
    pub back: [u8; 2],
    pub id: u16,
    pub position: [i16; 3],
    pub rotation_y: i16,
    pub params: u16,
}

/// One scene command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneCommand {
    SetStartPositionList(Vec<ActorEntry>),
    SetActorList(Vec<ActorEntry>),
    SetCollisionHeader(String),
    SetRoomList(Vec<String>),
    SetWind { direction: [i8; 3], strength: u8 },
    SetEntranceList(Vec<(u8, u8)>),
    SetSpecialObjects { elf_message: u8, global_object: u16 },
    SetRoomBehavior { game_play_flags: u8, flags: u32 },
    SetObjectList(Vec<u16>),
    SetPathways(Vec<String>),
    SetTransitionActorList(Vec<TransitionActorEntry>),
    SetTimeSettings { hour: u8, minute: u8, speed: u8 },
    SetSkyboxSettings { unknown: u8, skybox_id: u8, weather: u8, indoors: u8 },
    SetSkyboxModifier { disable_sky: u8, disable_sun_moon: u8 },
    SetExitList(Vec<u16>),
    EndMarker,
    SetSoundSettings { reverb: u8, nature_ambience: u8, sequence: u8 },
    SetEchoSettings(u8),
    SetCutscenes(String),
    SetCameraSettings { camera_mode: u8, world_map_area: u32 },
}

impl SceneCommand {
    /// Numeric command id.
    pub fn id(&self) -> u32 {
        match self {
            Self::SetStartPositionList(_) => 0x00,
            Self::SetActorList(_) => 0x01,
            Self::SetCollisionHeader(_) => 0x03,
            Self::SetRoomList(_) => 0x04,
            Self::SetWind { .. } => 0x05,
            Self::SetEntranceList(_) => 0x06,
            Self::SetSpecialObjects { .. } => 0x07,
            Self::SetRoomBehavior { .. } => 0x08,
            Self::SetObjectList(_) => 0x0B,
            Self::SetPathways(_) => 0x0D,
            Self::SetTransitionActorList(_) => 0x0E,
            Self::SetTimeSettings { .. } => 0x10,
            Self::SetSkyboxSettings { .. } => 0x11,
            Self::SetSkyboxModifier { .. } => 0x12,
            Self::SetExitList(_) => 0x13,
            Self::EndMarker => 0x14,
            Self::SetSoundSettings { .. } => 0x15,
            Self::SetEchoSettings(_) => 0x16,
            Self::SetCutscenes(_) => 0x17,
            Self::SetCameraSettings { .. } => 0x19,
        }
    }

    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let id = reader.read_u32()?;
        Ok(match id {
            0x00 => Self::SetStartPositionList(reader.read_counted(ActorEntry::read)?),
            0x01 => Self::SetActorList(reader.read_counted(ActorEntry::read)?),
            0x03 => Self::SetCollisionHeader(reader.read_string()?.to_owned()),
            0x04 => Self::SetRoomList(read_strings(reader)?),
            0x05 => Self::SetWind {
                direction: [reader.read_i8()?, reader.read_i8()?, reader.read_i8()?],
                strength: reader.read_u8()?,
            },
            0x06 => Self::SetEntranceList(
                reader.read_counted(|r| Ok((r.read_u8()?, r.read_u8()?)))?,
            ),
            0x07 => Self::SetSpecialObjects {
                elf_message: reader.read_u8()?,
                global_object: reader.read_u16()?,
            },
            0x08 => Self::SetRoomBehavior {
                game_play_flags: reader.read_u8()?,
                flags: reader.read_u32()?,
            },
            0x0B => Self::SetObjectList(reader.read_counted(|r| r.read_u16())?),
            0x0D => Self::SetPathways(read_strings(reader)?),
            0x0E => Self::SetTransitionActorList(reader.read_counted(|r| {
                Ok(TransitionActorEntry {
                    front: r.read_array()?,
                    back: r.read_array()?,
                    id: r.read_u16()?,
                    position: r.read_vec3s()?,
                    rotation_y: r.read_i16()?,
                    params: r.read_u16()?,
                })
            })?),
            0x10 => Self::SetTimeSettings {
                hour: reader.read_u8()?,
                minute: reader.read_u8()?,
                speed: reader.read_u8()?,
            },
            0x11 => Self::SetSkyboxSettings {
                unknown: reader.read_u8()?,
                skybox_id: reader.read_u8()?,
                weather: reader.read_u8()?,
                indoors: reader.read_u8()?,
            },
            0x12 => Self::SetSkyboxModifier {
                disable_sky: reader.read_u8()?,
                disable_sun_moon: reader.read_u8()?,
            },
            0x13 => Self::SetExitList(reader.read_counted(|r| r.read_u16())?),
            0x14 => Self::EndMarker,
            0x15 => Self::SetSoundSettings {
                reverb: reader.read_u8()?,
                nature_ambience: reader.read_u8()?,
                sequence: reader.read_u8()?,
            },
            0x16 => Self::SetEchoSettings(reader.read_u8()?),
            0x17 => Self::SetCutscenes(reader.read_string()?.to_owned()),
            0x19 => Self::SetCameraSettings {
                camera_mode: reader.read_u8()?,
                world_map_area: reader.read_u32()?,
            },
            other => return Err(DecodeError::UnknownSceneCommand(other)),
        })
    }
}

fn read_strings(reader: &mut BinaryReader<'_>) -> Result<Vec<String>> {
    Ok(reader.read_counted(|r| r.read_string().map(str::to_owned))?)
}

/// A scene or room: an ordered list of commands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    pub commands: Vec<SceneCommand>,
}

impl Scene {
    /// Binary V0: command count, then `{u32 id, body}` per command.
    pub fn read_v0(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let count = reader.read_u32()?;
        let mut commands = Vec::with_capacity((count as usize).min(reader.remaining() / 4));
        for _ in 0..count {
            commands.push(SceneCommand::read(reader)?);
        }
        Ok(Self { commands })
    }

    /// Room paths listed by the scene.
    pub fn rooms(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands
            .iter()
            .filter_map(|command| match command {
                SceneCommand::SetRoomList(rooms) => Some(rooms),
                _ => None,
            })
            .flatten()
            .map(String::as_str)
    }
}
