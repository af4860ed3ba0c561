//! Zip-of-CSV persistence for temporal object-centric event logs
//!
//! The archive contains up to four CSV tables: `events.csv`, `objects.csv` (one row per
//! object snapshot, attribute values as wide columns), `e2o.csv` and `o2o.csv`. Validity
//! intervals are stored in the `ocel:timestamp:valid_from` / `ocel:timestamp:valid_to`
//! columns, snapshot IDs under `ocel:osid`.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use zip::ZipWriter;
use zip::ZipArchive;

use super::tocel_struct::{ObjectSnapshot, SnapshotAttribute, TOCELObject, TOCELRelationship, TOCEL};
use crate::ocel::archive::{
    column_index, format_time, format_value, parse_time, parse_value, read_csv_table,
    write_csv_table, OCELArchiveError, E2O_CSV, EVENTS_CSV, EVENT_ID_COL, EVENT_TYPE_COL,
    O2O_CSV, OBJECTS_CSV, OBJECT_ID_COL, OBJECT_TYPE_COL, QUALIFIER_COL, TARGET_OBJECT_ID_COL,
    TIMESTAMP_COL,
};
use crate::ocel::ocel_struct::{
    OCELEvent, OCELEventAttribute, OCELRelationship, OCELType, OCELTypeAttribute,
};

pub(crate) const SNAPSHOT_ID_COL: &str = "ocel:osid";
pub(crate) const VALID_FROM_COL: &str = "ocel:timestamp:valid_from";
pub(crate) const VALID_TO_COL: &str = "ocel:timestamp:valid_to";

///
/// Write a [`TOCEL`] as a zip-of-CSV archive
///
pub fn export_tocel_archive<W: Write + Seek>(
    writer: W,
    tocel: &TOCEL,
) -> Result<(), OCELArchiveError> {
    let mut zip = ZipWriter::new(writer);

    let event_attr_names: BTreeSet<&str> = tocel
        .events
        .iter()
        .flat_map(|e| e.attributes.iter().map(|a| a.name.as_str()))
        .collect();

    write_csv_table(&mut zip, EVENTS_CSV, |w| {
        let mut header = vec![EVENT_ID_COL, EVENT_TYPE_COL, TIMESTAMP_COL];
        header.extend(event_attr_names.iter().copied());
        w.write_record(&header)?;
        for e in &tocel.events {
            let mut record = vec![e.id.clone(), e.event_type.clone(), format_time(&e.time)];
            for name in &event_attr_names {
                record.push(
                    e.attributes
                        .iter()
                        .find(|a| a.name == *name)
                        .map(|a| format_value(&a.value))
                        .unwrap_or_default(),
                );
            }
            w.write_record(&record)?;
        }
        Ok(())
    })?;

    let snapshot_attr_names: BTreeSet<&str> = tocel
        .objects
        .iter()
        .flat_map(|o| o.snapshots.iter())
        .flat_map(|s| s.attributes.iter().map(|a| a.name.as_str()))
        .collect();

    write_csv_table(&mut zip, OBJECTS_CSV, |w| {
        let mut header = vec![
            OBJECT_ID_COL,
            OBJECT_TYPE_COL,
            SNAPSHOT_ID_COL,
            VALID_FROM_COL,
            VALID_TO_COL,
        ];
        header.extend(snapshot_attr_names.iter().copied());
        w.write_record(&header)?;
        for o in &tocel.objects {
            for s in &o.snapshots {
                let mut record = vec![
                    o.id.clone(),
                    s.object_type.clone(),
                    s.snapshot_id.clone().unwrap_or_default(),
                    format_time(&s.valid_from),
                    s.valid_to.as_ref().map(format_time).unwrap_or_default(),
                ];
                for name in &snapshot_attr_names {
                    record.push(
                        s.attribute_value(name)
                            .map(format_value)
                            .unwrap_or_default(),
                    );
                }
                w.write_record(&record)?;
            }
        }
        Ok(())
    })?;

    write_csv_table(&mut zip, E2O_CSV, |w| {
        w.write_record([
            EVENT_ID_COL,
            EVENT_TYPE_COL,
            TIMESTAMP_COL,
            OBJECT_ID_COL,
            QUALIFIER_COL,
        ])?;
        for e in &tocel.events {
            for rel in &e.relationships {
                w.write_record([
                    e.id.as_str(),
                    e.event_type.as_str(),
                    format_time(&e.time).as_str(),
                    rel.object_id.as_str(),
                    rel.qualifier.as_str(),
                ])?;
            }
        }
        Ok(())
    })?;

    write_csv_table(&mut zip, O2O_CSV, |w| {
        w.write_record([
            OBJECT_ID_COL,
            TARGET_OBJECT_ID_COL,
            QUALIFIER_COL,
            VALID_FROM_COL,
            VALID_TO_COL,
        ])?;
        for o in &tocel.objects {
            for rel in &o.relationships {
                w.write_record([
                    o.id.as_str(),
                    rel.object_id.as_str(),
                    rel.qualifier.as_str(),
                    rel.valid_from.as_ref().map(format_time).unwrap_or_default().as_str(),
                    rel.valid_to.as_ref().map(format_time).unwrap_or_default().as_str(),
                ])?;
            }
        }
        Ok(())
    })?;

    zip.finish()?;
    Ok(())
}

///
/// Write a [`TOCEL`] as a zip-of-CSV archive at the given file path
///
pub fn export_tocel_archive_to_path<P: AsRef<Path>>(
    tocel: &TOCEL,
    path: P,
) -> Result<(), OCELArchiveError> {
    export_tocel_archive(BufWriter::new(File::create(path)?), tocel)
}

fn parse_optional_time(s: &str) -> Result<Option<chrono::DateTime<chrono::Utc>>, OCELArchiveError> {
    if s.is_empty() {
        Ok(None)
    } else {
        parse_time(s).map(Some)
    }
}

///
/// Read a [`TOCEL`] from a zip-of-CSV archive
///
/// Event and object type declarations are reconstructed from the data; snapshot
/// histories are sorted by `valid_from`.
///
pub fn import_tocel_archive<R: Read + Seek>(reader: R) -> Result<TOCEL, OCELArchiveError> {
    let mut zip = ZipArchive::new(reader)?;

    let (ev_header, ev_records) =
        read_csv_table(&mut zip, EVENTS_CSV)?.ok_or(OCELArchiveError::MissingTable(EVENTS_CSV))?;
    let (ob_header, ob_records) = read_csv_table(&mut zip, OBJECTS_CSV)?
        .ok_or(OCELArchiveError::MissingTable(OBJECTS_CSV))?;
    let e2o_table = read_csv_table(&mut zip, E2O_CSV)?;
    let o2o_table = read_csv_table(&mut zip, O2O_CSV)?;

    // Objects: one snapshot per row, grouped by object ID
    let ob_id_idx = column_index(&ob_header, OBJECTS_CSV, OBJECT_ID_COL)?;
    let ob_type_idx = column_index(&ob_header, OBJECTS_CSV, OBJECT_TYPE_COL)?;
    let valid_from_idx = column_index(&ob_header, OBJECTS_CSV, VALID_FROM_COL)?;
    let snapshot_id_idx = ob_header.iter().position(|h| h == SNAPSHOT_ID_COL);
    let valid_to_idx = ob_header.iter().position(|h| h == VALID_TO_COL);
    let fixed_indices: Vec<usize> = [
        Some(ob_id_idx),
        Some(ob_type_idx),
        Some(valid_from_idx),
        snapshot_id_idx,
        valid_to_idx,
    ]
    .into_iter()
    .flatten()
    .collect();
    let attr_columns: Vec<(usize, &str)> = ob_header
        .iter()
        .enumerate()
        .filter(|(i, _)| !fixed_indices.contains(i))
        .collect();

    let mut objects: Vec<TOCELObject> = Vec::new();
    for r in &ob_records {
        let oid = r.get(ob_id_idx).unwrap_or_default();
        let snapshot = ObjectSnapshot {
            snapshot_id: snapshot_id_idx
                .and_then(|i| r.get(i))
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
            object_type: r.get(ob_type_idx).unwrap_or_default().to_string(),
            valid_from: parse_time(r.get(valid_from_idx).unwrap_or_default())?,
            valid_to: valid_to_idx
                .and_then(|i| r.get(i))
                .map(parse_optional_time)
                .transpose()?
                .flatten(),
            attributes: attr_columns
                .iter()
                .filter_map(|(i, name)| {
                    let raw = r.get(*i).unwrap_or_default();
                    if raw.is_empty() {
                        None
                    } else {
                        Some(SnapshotAttribute::new(name.to_string(), parse_value(raw)))
                    }
                })
                .collect(),
        };
        match objects.iter_mut().find(|o| o.id == oid) {
            Some(object) => object.snapshots.push(snapshot),
            None => objects.push(TOCELObject {
                id: oid.to_string(),
                snapshots: vec![snapshot],
                relationships: Vec::new(),
            }),
        }
    }
    for o in &mut objects {
        o.sort_snapshots();
    }

    if let Some((header, records)) = o2o_table {
        let oid_idx = column_index(&header, O2O_CSV, OBJECT_ID_COL)?;
        let target_idx = column_index(&header, O2O_CSV, TARGET_OBJECT_ID_COL)?;
        let qual_idx = column_index(&header, O2O_CSV, QUALIFIER_COL)?;
        let from_idx = header.iter().position(|h| h == VALID_FROM_COL);
        let to_idx = header.iter().position(|h| h == VALID_TO_COL);
        for r in &records {
            let oid = r.get(oid_idx).unwrap_or_default();
            if let Some(object) = objects.iter_mut().find(|o| o.id == oid) {
                object.relationships.push(TOCELRelationship {
                    object_id: r.get(target_idx).unwrap_or_default().to_string(),
                    qualifier: r.get(qual_idx).unwrap_or_default().to_string(),
                    valid_from: from_idx
                        .and_then(|i| r.get(i))
                        .map(parse_optional_time)
                        .transpose()?
                        .flatten(),
                    valid_to: to_idx
                        .and_then(|i| r.get(i))
                        .map(parse_optional_time)
                        .transpose()?
                        .flatten(),
                });
            }
        }
    }

    // Events (same layout as in the OCEL archive)
    let ev_id_idx = column_index(&ev_header, EVENTS_CSV, EVENT_ID_COL)?;
    let ev_type_idx = column_index(&ev_header, EVENTS_CSV, EVENT_TYPE_COL)?;
    let ev_time_idx = column_index(&ev_header, EVENTS_CSV, TIMESTAMP_COL)?;
    let ev_attr_columns: Vec<(usize, &str)> = ev_header
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != ev_id_idx && *i != ev_type_idx && *i != ev_time_idx)
        .collect();
    let mut events: Vec<OCELEvent> = Vec::with_capacity(ev_records.len());
    for r in &ev_records {
        let attributes = ev_attr_columns
            .iter()
            .filter_map(|(i, name)| {
                let raw = r.get(*i).unwrap_or_default();
                if raw.is_empty() {
                    None
                } else {
                    Some(OCELEventAttribute {
                        name: name.to_string(),
                        value: parse_value(raw),
                    })
                }
            })
            .collect();
        events.push(OCELEvent {
            id: r.get(ev_id_idx).unwrap_or_default().to_string(),
            event_type: r.get(ev_type_idx).unwrap_or_default().to_string(),
            time: parse_time(r.get(ev_time_idx).unwrap_or_default())?,
            attributes,
            relationships: Vec::new(),
        });
    }

    if let Some((header, records)) = e2o_table {
        let eid_idx = column_index(&header, E2O_CSV, EVENT_ID_COL)?;
        let oid_idx = column_index(&header, E2O_CSV, OBJECT_ID_COL)?;
        let qual_idx = column_index(&header, E2O_CSV, QUALIFIER_COL)?;
        for r in &records {
            let eid = r.get(eid_idx).unwrap_or_default();
            if let Some(event) = events.iter_mut().find(|e| e.id == eid) {
                event.relationships.push(OCELRelationship::new(
                    r.get(oid_idx).unwrap_or_default(),
                    r.get(qual_idx).unwrap_or_default(),
                ));
            }
        }
    }

    Ok(reconstruct_types(events, objects))
}

///
/// Read a [`TOCEL`] from a zip-of-CSV archive at the given file path
///
pub fn import_tocel_archive_from_path<P: AsRef<Path>>(path: P) -> Result<TOCEL, OCELArchiveError> {
    import_tocel_archive(BufReader::new(File::open(path)?))
}

fn reconstruct_types(events: Vec<OCELEvent>, objects: Vec<TOCELObject>) -> TOCEL {
    let mut event_types: Vec<OCELType> = Vec::new();
    for e in &events {
        if !event_types.iter().any(|t| t.name == e.event_type) {
            event_types.push(OCELType {
                name: e.event_type.clone(),
                attributes: Vec::new(),
            });
        }
        let et = event_types
            .iter_mut()
            .find(|t| t.name == e.event_type)
            .unwrap();
        for at in &e.attributes {
            if !et.attributes.iter().any(|a| a.name == at.name) {
                et.attributes
                    .push(OCELTypeAttribute::new(at.name.clone(), at.value.type_name()));
            }
        }
    }
    let mut object_types: Vec<OCELType> = Vec::new();
    for o in &objects {
        for s in &o.snapshots {
            if !object_types.iter().any(|t| t.name == s.object_type) {
                object_types.push(OCELType {
                    name: s.object_type.clone(),
                    attributes: Vec::new(),
                });
            }
            let ot = object_types
                .iter_mut()
                .find(|t| t.name == s.object_type)
                .unwrap();
            for at in &s.attributes {
                if !ot.attributes.iter().any(|a| a.name == at.name) {
                    ot.attributes
                        .push(OCELTypeAttribute::new(at.name.clone(), at.value.type_name()));
                }
            }
        }
    }
    TOCEL {
        event_types,
        object_types,
        events,
        objects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocel::ocel_struct::OCELAttributeValue;
    use chrono::{DateTime, TimeZone, Utc};
    use std::io::Cursor;

    fn t(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap()
    }

    fn sample_tocel() -> TOCEL {
        TOCEL {
            event_types: vec![OCELType {
                name: "contact".into(),
                attributes: Vec::new(),
            }],
            object_types: vec![
                OCELType {
                    name: "lead".into(),
                    attributes: vec![OCELTypeAttribute::new("score", "integer")],
                },
                OCELType {
                    name: "customer".into(),
                    attributes: Vec::new(),
                },
            ],
            events: vec![OCELEvent::new(
                "e1",
                "contact",
                t(9),
                Vec::new(),
                vec![OCELRelationship::new("c1", "contacted")],
            )],
            objects: vec![TOCELObject {
                id: "c1".into(),
                snapshots: vec![
                    ObjectSnapshot {
                        snapshot_id: Some("c1s1".into()),
                        object_type: "lead".into(),
                        valid_from: t(8),
                        valid_to: Some(t(12)),
                        attributes: vec![SnapshotAttribute::new(
                            "score",
                            OCELAttributeValue::Integer(10),
                        )],
                    },
                    ObjectSnapshot {
                        snapshot_id: Some("c1s2".into()),
                        object_type: "customer".into(),
                        valid_from: t(12),
                        valid_to: None,
                        attributes: Vec::new(),
                    },
                ],
                relationships: vec![TOCELRelationship {
                    object_id: "a1".into(),
                    qualifier: "managed by".into(),
                    valid_from: Some(t(8)),
                    valid_to: None,
                }],
            }],
        }
    }

    #[test]
    fn tocel_archive_roundtrip() {
        let tocel = sample_tocel();
        let mut buf = Cursor::new(Vec::new());
        export_tocel_archive(&mut buf, &tocel).unwrap();
        buf.set_position(0);
        let imported = import_tocel_archive(buf).unwrap();

        assert_eq!(imported.events.len(), 1);
        assert_eq!(imported.events[0].relationships, tocel.events[0].relationships);

        assert_eq!(imported.objects.len(), 1);
        let c1 = &imported.objects[0];
        assert_eq!(c1.snapshots.len(), 2);
        assert_eq!(c1.snapshots[0].snapshot_id.as_deref(), Some("c1s1"));
        assert_eq!(c1.snapshots[0].object_type, "lead");
        assert_eq!(c1.snapshots[0].valid_to, Some(t(12)));
        assert_eq!(
            c1.snapshots[0].attribute_value("score"),
            Some(&OCELAttributeValue::Integer(10))
        );
        assert_eq!(c1.snapshots[1].object_type, "customer");
        assert_eq!(c1.snapshots[1].valid_to, None);
        assert_eq!(c1.relationships, tocel.objects[0].relationships);

        assert!(imported.object_types.iter().any(|t| t.name == "lead"));
        assert!(imported.object_types.iter().any(|t| t.name == "customer"));
    }
}
