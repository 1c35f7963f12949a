use crate::error::Result;
use crate::layout::SectionId;
use crate::sections::{Section, SectionContext};
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnigmaStage {
    pub level: i32,
    pub stage_id: i32,
    /// 0 = decoding, 1 = decoded, 2 = cleared.
    pub decoding_status: u8,
    pub start_time: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Enigma {
    pub energy_since_1: i32,
    pub energy_since_2: i32,
    pub level: i32,
    pub stages: Vec<EnigmaStage>,
}

impl Section for Enigma {
    const ID: SectionId = SectionId::Enigma;

    fn is_present(version: GameVersion) -> bool {
        version >= 110_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let energy_since_1 = r.read_i32()?;
        let energy_since_2 = r.read_i32()?;
        let level = r.read_i32()?;
        let n = r.read_byte_count()?;
        let mut stages = Vec::with_capacity(n);
        for _ in 0..n {
            stages.push(EnigmaStage {
                level: r.read_i32()?,
                stage_id: r.read_i32()?,
                decoding_status: r.read_u8()?,
                start_time: r.read_f64()?,
            });
        }
        Ok(Self {
            energy_since_1,
            energy_since_2,
            level,
            stages,
        })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        w.write_i32(self.energy_since_1);
        w.write_i32(self.energy_since_2);
        w.write_i32(self.level);
        w.write_byte_count(self.stages.len(), "enigma.stages")?;
        for stage in &self.stages {
            w.write_i32(stage.level);
            w.write_i32(stage.stage_id);
            w.write_u8(stage.decoding_status);
            w.write_f64(stage.start_time);
        }
        Ok(())
    }
}
