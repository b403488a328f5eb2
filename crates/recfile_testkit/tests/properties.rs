//! Property tests across the codec and container.

use proptest::prelude::*;
use recfile_codec::{decode, encode_record, RecordDecoder};
use recfile_core::{verify_container, ContainerConfig, ContainerReader};
use recfile_testkit::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn codec_roundtrip((schema, records) in schema_and_records_strategy(6, 8)) {
        for record in records {
            let bytes = encode_record(&record).unwrap();
            prop_assert_eq!(decode(&schema, &bytes).unwrap(), record);
        }
    }

    #[test]
    fn container_roundtrip_preserves_order((schema, records) in schema_and_records_strategy(6, 16)) {
        let read = read_all(memory_container(&schema, &records));
        prop_assert_eq!(read, records);
    }

    #[test]
    fn verify_counts_every_record((schema, records) in schema_and_records_strategy(4, 16)) {
        let stats = verify_container(memory_container(&schema, &records)).unwrap();
        prop_assert_eq!(stats.record_count, records.len() as u64);
    }

    #[test]
    fn projection_matches_full_read(
        (schema, records, projection) in schema_and_records_strategy(6, 8)
            .prop_flat_map(|(schema, records)| {
                (Just(schema.clone()), Just(records), projection_strategy(schema))
            })
    ) {
        let reader = ContainerReader::from_backend_with_projection(
            memory_container(&schema, &records),
            &projection,
            ContainerConfig::new().read_buffer_size(16),
        )
        .unwrap();

        let projected: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
        prop_assert_eq!(projected.len(), records.len());

        for (full, partial) in records.iter().zip(&projected) {
            for (field, value) in partial.iter() {
                if projection.field(field.name()).is_some() {
                    prop_assert_eq!(value, full.get(field.name()).unwrap());
                } else {
                    prop_assert_eq!(value, None);
                }
            }
        }
    }

    #[test]
    fn projected_decoder_agrees_with_container_reader(
        (schema, records, projection) in schema_and_records_strategy(5, 4)
            .prop_flat_map(|(schema, records)| {
                (Just(schema.clone()), Just(records), projection_strategy(schema))
            })
    ) {
        let decoder = RecordDecoder::with_projection(schema.clone(), &projection).unwrap();
        let from_container: Vec<_> = ContainerReader::from_backend_with_projection(
            memory_container(&schema, &records),
            &projection,
            ContainerConfig::default(),
        )
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

        for (record, read) in records.iter().zip(from_container) {
            let bytes = encode_record(record).unwrap();
            prop_assert_eq!(decoder.decode(&bytes).unwrap(), read);
        }
    }
}
