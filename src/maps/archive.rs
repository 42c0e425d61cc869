//! 映射的持久化
//!
//! 映射存为带名称和版本号的 JSON 记录，载入后的映射与保存前的映射对所有输入给出相同的像。

use super::permutation::is_permutation;
use super::{
    AffineMap, Injection, LinearMap, Map, MapComposition, Permutation, Projection, Translation,
    TsAffineMap,
};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fs::{read_to_string, write};
use std::path::Path;

const NAME: &str = "hnco::map";
const VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapArchive {
    Translation(Translation),
    Permutation(Permutation),
    Linear(LinearMap),
    Affine(AffineMap),
    TsAffine(TsAffineMap),
    Composition {
        outer: Box<MapArchive>,
        inner: Box<MapArchive>,
    },
    Injection {
        bit_positions: Vec<usize>,
        output_size: usize,
    },
    Projection {
        bit_positions: Vec<usize>,
        input_size: usize,
    },
}

impl MapArchive {
    /// 还原为映射，同时检查反序列化得到的数据是否合法
    pub fn into_map(self) -> Result<Box<dyn Map>, Error> {
        let map: Box<dyn Map> = match self {
            MapArchive::Translation(map) => Box::new(map),
            MapArchive::Permutation(map) => {
                if !is_permutation(map.as_slice()) {
                    return Err("文件中的置换不合法".into());
                }
                Box::new(map)
            }
            MapArchive::Linear(map) => {
                if !map.matrix().is_valid() {
                    return Err("线性映射的矩阵中存在长度不等于列数的行".into());
                }
                Box::new(map)
            }
            MapArchive::Affine(map) => {
                if !map.matrix().is_valid() {
                    return Err("仿射映射的矩阵中存在长度不等于列数的行".into());
                }
                if map.matrix().num_rows() != map.vector().len() {
                    return Err("仿射映射的矩阵与向量尺寸不一致".into());
                }
                Box::new(map)
            }
            MapArchive::TsAffine(map) => {
                if !map.sequence().is_valid(map.vector().len()) {
                    return Err("文件中的初等变换序列不合法".into());
                }
                Box::new(map)
            }
            MapArchive::Composition { outer, inner } => {
                let outer = outer.into_map()?;
                let inner = inner.into_map()?;
                if outer.input_size() != inner.output_size() {
                    return Err("复合映射的尺寸不匹配".into());
                }
                Box::new(MapComposition::new(outer, inner))
            }
            MapArchive::Injection {
                bit_positions,
                output_size,
            } => Box::new(Injection::new(bit_positions, output_size)?),
            MapArchive::Projection {
                bit_positions,
                input_size,
            } => Box::new(Projection::new(bit_positions, input_size)?),
        };
        Ok(map)
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    name: String,
    version: u32,
    payload: MapArchive,
}

pub fn save(map: &dyn Map, path: &Path) -> Result<(), Error> {
    let envelope = Envelope {
        name: NAME.to_string(),
        version: VERSION,
        payload: map.to_archive(),
    };
    write(path, serde_json::to_string_pretty(&envelope)?)?;
    Ok(())
}

pub fn load(path: &Path) -> Result<Box<dyn Map>, Error> {
    let content = read_to_string(path)
        .map_err(|e| Error::from(format!("无法读取映射文件 {}：{e}", path.display())))?;
    let envelope: Envelope = serde_json::from_str(&content)?;
    if envelope.name != NAME || envelope.version != VERSION {
        return Err(format!(
            "映射文件 {} 的格式为 {} v{}，需要 {NAME} v{VERSION}",
            path.display(),
            envelope.name,
            envelope.version
        )
        .into());
    }
    envelope.payload.into_map()
}
