// Vellum - CAD document interchange library
//
// Copyright (c) 2026 Vellum contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Document loading: the explicit two-pass algorithm.
//!
//! Pass 1 constructs every entity from the tag stream and inserts it
//! into the entity database keyed by handle, storing handle-valued
//! attributes raw. Pass 2 walks the constructed entities against the
//! fully populated database and builds the navigable graph: table name
//! indexes, block entity spaces, layout wiring. The two passes are a
//! hard requirement, not an implementation detail: the format permits
//! references to entities defined later in the stream.
//!
//! Load order inside pass 2: tables before block records, block records
//! before layouts, layouts before graphical owner assignment.

use crate::document::{Document, RawSection, MODELSPACE_NAME, PAPERSPACE_NAME};
use crate::entity::Entity;
use crate::error::{DxfError, DxfResult, LoadWarning};
use crate::factory::entity_from_record;
use crate::handle::Handle;
use crate::header::HeaderSection;
use crate::limits::Limits;
use crate::record::{split_records, EntityRecord, RawRecord};
use crate::schema::is_registered;
use crate::tables::{TableRole, Tables};
use crate::tag::{load_tags_bytes, load_tags_str, ReadMode, Tag, TagValue};
use crate::version::DxfVersion;
use std::collections::HashMap;

/// Options for loading.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Tokenization error policy.
    pub mode: ReadMode,
    /// Security limits.
    pub limits: Limits,
}

impl LoadOptions {
    /// Create a new builder.
    pub fn builder() -> LoadOptionsBuilder {
        LoadOptionsBuilder::new()
    }

    /// Shorthand for recovery-mode options.
    pub fn recover() -> Self {
        Self {
            mode: ReadMode::Recover,
            limits: Limits::default(),
        }
    }
}

/// Builder for ergonomic construction of [`LoadOptions`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptionsBuilder {
    options: LoadOptions,
}

impl LoadOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable recovery mode (default: strict).
    pub fn recover(mut self, recover: bool) -> Self {
        self.options.mode = if recover {
            ReadMode::Recover
        } else {
            ReadMode::Strict
        };
        self
    }

    /// Replace the full limit set.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.options.limits = limits;
        self
    }

    /// Cap the number of tags.
    pub fn max_tags(mut self, max_tags: usize) -> Self {
        self.options.limits.max_tags = max_tags;
        self
    }

    /// Cap the number of entities.
    pub fn max_entities(mut self, max_entities: usize) -> Self {
        self.options.limits.max_entities = max_entities;
        self
    }

    pub fn build(self) -> LoadOptions {
        self.options
    }
}

/// Load a document from text input.
pub fn load_str(input: &str, options: &LoadOptions) -> DxfResult<(Document, Vec<LoadWarning>)> {
    let (tags, warnings) = load_tags_str(input, options.mode, &options.limits)?;
    load_document(tags, warnings, options)
}

/// Load a document from raw bytes (text or binary, sniffed).
pub fn load_bytes(data: &[u8], options: &LoadOptions) -> DxfResult<(Document, Vec<LoadWarning>)> {
    let (tags, warnings) = load_tags_bytes(data, options.mode, &options.limits)?;
    load_document(tags, warnings, options)
}

// ==================== Section splitting ====================

struct Section {
    name: String,
    tags: Vec<Tag>,
}

fn split_sections(
    tags: Vec<Tag>,
    mode: ReadMode,
    warnings: &mut Vec<LoadWarning>,
) -> DxfResult<Vec<Section>> {
    let mut sections = Vec::new();
    let mut iter = tags.into_iter().peekable();
    loop {
        let Some(tag) = iter.next() else {
            break;
        };
        if !tag.is_structure_tag() {
            match mode {
                ReadMode::Strict => {
                    return Err(DxfError::structure(
                        format!("tag with code {} outside any section", tag.code),
                        0,
                    ));
                }
                ReadMode::Recover => {
                    warnings.push(LoadWarning::new(
                        format!("skipped tag with code {} outside any section", tag.code),
                        0,
                    ));
                    continue;
                }
            }
        }
        match tag.value.as_str() {
            Some("SECTION") => {
                let name = match iter.peek() {
                    Some(name_tag) if name_tag.code == 2 => {
                        let name = name_tag.value.as_str().unwrap_or_default().to_string();
                        iter.next();
                        name
                    }
                    _ => match mode {
                        ReadMode::Strict => {
                            return Err(DxfError::structure("section without a name tag", 0));
                        }
                        ReadMode::Recover => {
                            warnings.push(LoadWarning::new("section without a name tag", 0));
                            String::new()
                        }
                    },
                };
                let mut content = Vec::new();
                let mut terminated = false;
                for inner in iter.by_ref() {
                    if inner.is_structure_tag() && inner.value.as_str() == Some("ENDSEC") {
                        terminated = true;
                        break;
                    }
                    content.push(inner);
                }
                if !terminated {
                    match mode {
                        ReadMode::Strict => {
                            return Err(DxfError::structure(
                                format!("section {} is not terminated", name),
                                0,
                            ));
                        }
                        ReadMode::Recover => {
                            warnings.push(LoadWarning::new(
                                format!("section {} is not terminated", name),
                                0,
                            ));
                        }
                    }
                }
                sections.push(Section { name, tags: content });
            }
            Some("EOF") => break,
            Some(other) => match mode {
                ReadMode::Strict => {
                    return Err(DxfError::structure(
                        format!("unexpected {} record outside any section", other),
                        0,
                    ));
                }
                ReadMode::Recover => {
                    warnings.push(LoadWarning::new(
                        format!("skipped {} record outside any section", other),
                        0,
                    ));
                }
            },
            None => {}
        }
    }
    Ok(sections)
}

// ==================== Header parsing ====================

fn parse_header(tags: Vec<Tag>, warnings: &mut Vec<LoadWarning>) -> HeaderSection {
    let mut header = HeaderSection::new();
    let mut current: Option<(String, Vec<Tag>)> = None;
    for tag in tags {
        if tag.code == 9 {
            if let Some((name, value_tags)) = current.take() {
                header.set(&name, value_tags);
            }
            current = Some((tag.value.as_str().unwrap_or_default().to_string(), Vec::new()));
        } else if let Some((_, value_tags)) = current.as_mut() {
            value_tags.push(tag);
        } else {
            warnings.push(LoadWarning::new(
                format!("skipped header tag with code {} before any variable", tag.code),
                0,
            ));
        }
    }
    if let Some((name, value_tags)) = current.take() {
        header.set(&name, value_tags);
    }
    header
}

/// Resolve the declared format revision. An unknown token newer than
/// anything supported is tolerated as the latest revision, with the
/// unknown attributes it brings preserved opaquely downstream.
fn declared_version(header: &HeaderSection, warnings: &mut Vec<LoadWarning>) -> DxfVersion {
    if let Some(version) = header.version() {
        return version;
    }
    let token = header
        .get(crate::header::ACADVER)
        .and_then(|tags| tags.first())
        .and_then(|tag| tag.value.as_str());
    match token {
        Some(token) if token > DxfVersion::LATEST.token() => {
            warnings.push(LoadWarning::new(
                format!(
                    "version {} is newer than supported, treated as {}",
                    token,
                    DxfVersion::LATEST
                ),
                0,
            ));
            DxfVersion::LATEST
        }
        Some(token) => {
            warnings.push(LoadWarning::new(
                format!("unknown version token \"{}\", assuming {}", token, DxfVersion::R12),
                0,
            ));
            DxfVersion::R12
        }
        None => DxfVersion::R12,
    }
}

// ==================== Pass 1 structures ====================

struct LoadedTable {
    role: TableRole,
    head_handle: Option<Handle>,
    entries: Vec<Entity>,
}

struct LoadedBlock {
    head: Entity,
    entities: Vec<Entity>,
    endblk: Option<Entity>,
}

struct Pass1 {
    header: HeaderSection,
    version: DxfVersion,
    tables: Vec<LoadedTable>,
    blocks: Vec<LoadedBlock>,
    entities: Vec<Entity>,
    objects: Vec<Entity>,
    classes: Vec<RawRecord>,
    extra_sections: Vec<RawSection>,
}

fn build_entity(
    raw: RawRecord,
    version: DxfVersion,
    mode: ReadMode,
    limits: &Limits,
    warnings: &mut Vec<LoadWarning>,
) -> DxfResult<Option<Entity>> {
    let keep_raw = !is_registered(&raw.type_name);
    let record = EntityRecord::from_raw(raw, mode, limits, warnings, keep_raw)?;
    Ok(record.map(|record| entity_from_record(record, version, warnings)))
}

fn parse_table_section(
    tags: Vec<Tag>,
    version: DxfVersion,
    mode: ReadMode,
    limits: &Limits,
    warnings: &mut Vec<LoadWarning>,
) -> DxfResult<Vec<LoadedTable>> {
    let (prelude, records) = split_records(tags);
    if !prelude.is_empty() {
        warnings.push(LoadWarning::new("stray tags before first table", 0));
    }
    let mut tables = Vec::new();
    let mut current: Option<LoadedTable> = None;
    for raw in records {
        match raw.type_name.as_str() {
            "TABLE" => {
                if let Some(table) = current.take() {
                    warnings.push(LoadWarning::new(
                        format!("table {} is not terminated", table.role.table_name()),
                        0,
                    ));
                    tables.push(table);
                }
                let name = raw
                    .tags
                    .iter()
                    .find(|tag| tag.code == 2)
                    .and_then(|tag| tag.value.as_str())
                    .unwrap_or_default()
                    .to_string();
                let head_handle = raw
                    .tags
                    .iter()
                    .find(|tag| tag.code == 5)
                    .and_then(|tag| tag.value.as_handle());
                match TableRole::from_table_name(&name) {
                    Some(role) => {
                        current = Some(LoadedTable {
                            role,
                            head_handle,
                            entries: Vec::new(),
                        });
                    }
                    None => {
                        warnings.push(LoadWarning::new(
                            format!("skipped unsupported table \"{}\"", name),
                            0,
                        ));
                        current = None;
                    }
                }
            }
            "ENDTAB" => {
                if let Some(table) = current.take() {
                    tables.push(table);
                }
            }
            _ => {
                let Some(table) = current.as_mut() else {
                    continue; // entry of a skipped table
                };
                if raw.type_name != table.role.table_name() {
                    warnings.push(LoadWarning::new(
                        format!(
                            "skipped {} record inside {} table",
                            raw.type_name,
                            table.role.table_name()
                        ),
                        0,
                    ));
                    continue;
                }
                if let Some(entity) = build_entity(raw, version, mode, limits, warnings)? {
                    table.entries.push(entity);
                }
            }
        }
    }
    if let Some(table) = current.take() {
        warnings.push(LoadWarning::new(
            format!("table {} is not terminated", table.role.table_name()),
            0,
        ));
        tables.push(table);
    }
    Ok(tables)
}

fn parse_blocks_section(
    tags: Vec<Tag>,
    version: DxfVersion,
    mode: ReadMode,
    limits: &Limits,
    warnings: &mut Vec<LoadWarning>,
) -> DxfResult<Vec<LoadedBlock>> {
    let (prelude, records) = split_records(tags);
    if !prelude.is_empty() {
        warnings.push(LoadWarning::new("stray tags before first block", 0));
    }
    let mut blocks = Vec::new();
    let mut current: Option<LoadedBlock> = None;
    for raw in records {
        match raw.type_name.as_str() {
            "BLOCK" => {
                if let Some(block) = current.take() {
                    warnings.push(LoadWarning::new("block without ENDBLK", 0));
                    blocks.push(block);
                }
                if let Some(head) = build_entity(raw, version, mode, limits, warnings)? {
                    current = Some(LoadedBlock {
                        head,
                        entities: Vec::new(),
                        endblk: None,
                    });
                }
            }
            "ENDBLK" => {
                if let Some(mut block) = current.take() {
                    block.endblk = build_entity(raw, version, mode, limits, warnings)?;
                    blocks.push(block);
                } else {
                    warnings.push(LoadWarning::new("ENDBLK without matching BLOCK", 0));
                }
            }
            _ => {
                let entity = build_entity(raw, version, mode, limits, warnings)?;
                let (Some(block), Some(entity)) = (current.as_mut(), entity) else {
                    continue;
                };
                block.entities.push(entity);
            }
        }
    }
    if let Some(block) = current.take() {
        warnings.push(LoadWarning::new("block without ENDBLK", 0));
        blocks.push(block);
    }
    Ok(blocks)
}

fn parse_entity_section(
    tags: Vec<Tag>,
    version: DxfVersion,
    mode: ReadMode,
    limits: &Limits,
    warnings: &mut Vec<LoadWarning>,
) -> DxfResult<Vec<Entity>> {
    let (prelude, records) = split_records(tags);
    if !prelude.is_empty() {
        warnings.push(LoadWarning::new("stray tags before first record", 0));
    }
    let mut entities = Vec::new();
    for raw in records {
        if let Some(entity) = build_entity(raw, version, mode, limits, warnings)? {
            entities.push(entity);
        }
    }
    Ok(entities)
}

fn run_pass1(
    tags: Vec<Tag>,
    options: &LoadOptions,
    warnings: &mut Vec<LoadWarning>,
) -> DxfResult<Pass1> {
    let mode = options.mode;
    let limits = &options.limits;
    let sections = split_sections(tags, mode, warnings)?;

    // The header decides the version every other section is parsed
    // against, so it is processed first regardless of file position.
    let mut header = HeaderSection::new();
    for section in &sections {
        if section.name == "HEADER" {
            header = parse_header(section.tags.clone(), warnings);
            break;
        }
    }
    let version = declared_version(&header, warnings);

    let mut pass1 = Pass1 {
        header,
        version,
        tables: Vec::new(),
        blocks: Vec::new(),
        entities: Vec::new(),
        objects: Vec::new(),
        classes: Vec::new(),
        extra_sections: Vec::new(),
    };

    for section in sections {
        match section.name.as_str() {
            "HEADER" => {}
            "CLASSES" => {
                let (_, records) = split_records(section.tags);
                pass1.classes.extend(records);
            }
            "TABLES" => {
                pass1
                    .tables
                    .extend(parse_table_section(section.tags, version, mode, limits, warnings)?);
            }
            "BLOCKS" => {
                pass1
                    .blocks
                    .extend(parse_blocks_section(section.tags, version, mode, limits, warnings)?);
            }
            "ENTITIES" => {
                pass1
                    .entities
                    .extend(parse_entity_section(section.tags, version, mode, limits, warnings)?);
            }
            "OBJECTS" => {
                pass1
                    .objects
                    .extend(parse_entity_section(section.tags, version, mode, limits, warnings)?);
            }
            _ => {
                let (_, records) = split_records(section.tags);
                pass1.extra_sections.push(RawSection {
                    name: section.name,
                    records,
                });
            }
        }
    }
    Ok(pass1)
}

// ==================== Pass 2: resolution ====================

/// Store one entity, dropping or failing on handle collision.
fn store(
    db: &mut crate::database::EntityDatabase,
    entity: Entity,
    mode: ReadMode,
    warnings: &mut Vec<LoadWarning>,
) -> DxfResult<Option<Handle>> {
    match db.add(entity) {
        Ok(handle) => Ok(Some(handle)),
        Err(err) => match mode {
            ReadMode::Strict => Err(err),
            ReadMode::Recover => {
                warnings.push(LoadWarning::new(err.message, 0));
                Ok(None)
            }
        },
    }
}

fn load_document(
    tags: Vec<Tag>,
    mut warnings: Vec<LoadWarning>,
    options: &LoadOptions,
) -> DxfResult<(Document, Vec<LoadWarning>)> {
    let mode = options.mode;
    let pass1 = run_pass1(tags, options, &mut warnings)?;
    let version = pass1.version;

    let entity_count = pass1
        .tables
        .iter()
        .map(|table| table.entries.len())
        .sum::<usize>()
        + pass1
            .blocks
            .iter()
            .map(|block| block.entities.len() + 2)
            .sum::<usize>()
        + pass1.entities.len()
        + pass1.objects.len();
    if entity_count > options.limits.max_entities {
        return Err(DxfError::limit("too many entities", 0));
    }

    // Handles assigned to handle-less entities must stay above every
    // explicit handle anywhere in the file, so the seed is computed
    // before the first insertion.
    let mut max_handle = pass1
        .header
        .handle_seed()
        .map(|handle| handle.as_u64())
        .unwrap_or(0);
    let explicit = pass1
        .tables
        .iter()
        .flat_map(|table| table.entries.iter())
        .chain(pass1.blocks.iter().flat_map(|block| {
            std::iter::once(&block.head)
                .chain(block.entities.iter())
                .chain(block.endblk.iter())
        }))
        .chain(pass1.entities.iter())
        .chain(pass1.objects.iter())
        .filter_map(|entity| entity.handle());
    for handle in explicit {
        max_handle = max_handle.max(handle.as_u64());
    }
    let mut db = crate::database::EntityDatabase::with_seed(max_handle);

    // Pass 2a: tables before anything else.
    let mut tables = Tables::new();
    for loaded in pass1.tables {
        let table = tables.by_role_mut(loaded.role);
        table.set_handle(loaded.head_handle);
        for mut entry in loaded.entries {
            if entry.owner().is_none() {
                entry.set_owner(loaded.head_handle);
            }
            let name = entry.name().unwrap_or_default();
            let Some(handle) = store(&mut db, entry, mode, &mut warnings)? else {
                continue;
            };
            if name.is_empty() {
                warnings.push(LoadWarning::new(
                    format!("{} entry {} has no name", loaded.role.table_name(), handle),
                    0,
                ));
                continue;
            }
            if let Err(err) = table.add_entry(&name, handle) {
                warnings.push(LoadWarning::new(err.message, 0));
            }
        }
    }

    // Pass 2b: block records own their entity spaces.
    let mut spaces: HashMap<Handle, Vec<Handle>> = HashMap::new();
    let mut blocks_order: Vec<Handle> = Vec::new();
    let mut block_heads: HashMap<Handle, (Option<Handle>, Option<Handle>)> = HashMap::new();
    for record in tables.block_records().entries() {
        spaces.insert(*record, Vec::new());
        blocks_order.push(*record);
    }

    let ensure_record = |name: &str,
                             tables: &mut Tables,
                             db: &mut crate::database::EntityDatabase,
                             spaces: &mut HashMap<Handle, Vec<Handle>>,
                             blocks_order: &mut Vec<Handle>|
     -> DxfResult<Handle> {
        if let Some(handle) = tables.block_records().get(name) {
            return Ok(handle);
        }
        let mut entity = Entity::new("BLOCK_RECORD")?;
        entity.set("name", TagValue::Text(name.to_string()))?;
        let handle = db.add(entity)?;
        tables
            .by_role_mut(TableRole::BlockRecord)
            .add_entry(name, handle)?;
        spaces.insert(handle, Vec::new());
        blocks_order.push(handle);
        Ok(handle)
    };

    for block in pass1.blocks {
        let name = block.head.name().unwrap_or_default();
        let record = if name.is_empty() {
            warnings.push(LoadWarning::new(
                "block without a name, entities moved to model space",
                0,
            ));
            ensure_record(MODELSPACE_NAME, &mut tables, &mut db, &mut spaces, &mut blocks_order)?
        } else {
            ensure_record(&name, &mut tables, &mut db, &mut spaces, &mut blocks_order)?
        };
        let head_handle = store(&mut db, block.head, mode, &mut warnings)?;
        let endblk_handle = match block.endblk {
            Some(endblk) => store(&mut db, endblk, mode, &mut warnings)?,
            None => None,
        };
        block_heads.insert(record, (head_handle, endblk_handle));
        for mut entity in block.entities {
            if entity.owner().is_none() {
                entity.set_owner(Some(record));
            }
            if let Some(handle) = store(&mut db, entity, mode, &mut warnings)? {
                spaces.entry(record).or_default().push(handle);
            }
        }
    }

    let modelspace = ensure_record(
        MODELSPACE_NAME,
        &mut tables,
        &mut db,
        &mut spaces,
        &mut blocks_order,
    )?;

    // Pass 2c: entities of the ENTITIES section resolve their owner
    // against the now-complete block record set; the paperspace flag
    // is the fallback for files without owner tags.
    let mut paperspace = tables.block_records().get(PAPERSPACE_NAME);
    for entity in pass1.entities {
        let flagged_paper = entity.integer("paperspace").unwrap_or(0) != 0;
        let owner = entity.owner();
        let target = match owner.filter(|handle| spaces.contains_key(handle)) {
            Some(record) => record,
            None if flagged_paper => match paperspace {
                Some(record) => record,
                None => {
                    let record = ensure_record(
                        PAPERSPACE_NAME,
                        &mut tables,
                        &mut db,
                        &mut spaces,
                        &mut blocks_order,
                    )?;
                    paperspace = Some(record);
                    record
                }
            },
            None => modelspace,
        };
        let mut entity = entity;
        if entity.owner().is_none() {
            entity.set_owner(Some(target));
        }
        if let Some(handle) = store(&mut db, entity, mode, &mut warnings)? {
            spaces.entry(target).or_default().push(handle);
        }
    }

    // Pass 2d: objects, then layout wiring in tab order.
    let mut objects = Vec::new();
    for entity in pass1.objects {
        if let Some(handle) = store(&mut db, entity, mode, &mut warnings)? {
            objects.push(handle);
        }
    }
    let mut layouts: Vec<(i64, usize, Handle)> = Vec::new();
    for (position, handle) in objects.iter().enumerate() {
        let Some(entity) = db.get(*handle) else {
            continue;
        };
        if entity.type_name() == "LAYOUT" {
            let order = entity.integer("tab_order").unwrap_or(0);
            layouts.push((order, position, *handle));
        }
    }
    layouts.sort();
    let layouts: Vec<Handle> = layouts.into_iter().map(|(_, _, handle)| handle).collect();

    let mut header = pass1.header;
    header.set_version(version);

    let doc = Document::from_parts(
        version,
        header,
        db,
        tables,
        spaces,
        blocks_order,
        block_heads,
        layouts,
        objects,
        pass1.classes,
        pass1.extra_sections,
        modelspace,
    );
    Ok((doc, warnings))
}
