//! Container header validation.
//!
//! `GuardedDecoder` wraps any `Protocol` and checks every list, set and map
//! header right after its bytes are read, before a caller gets the chance
//! to allocate `size` slots or recurse into `size` elements. All other
//! reads go straight to the wrapped decoder.
//!
//! The size budget assumes each element takes at least one byte on the
//! wire. It catches grossly oversized declarations, not every size that
//! the remaining input cannot satisfy.

use crate::config::GuardConfig;
use crate::decoder::*;
use crate::error::{ElementPosition, Error, Result};
use crate::wire_type::*;


pub fn check_container_size(size: i32, budget: Option<i32>) -> Result<()> {
    if size < 0 {
        return Err(Error::NegativeContainerSize { size });
    }
    if let Some(budget) = budget {
        if size > budget {
            return Err(Error::ContainerSizeExceedsBudget { size, budget });
        }
    }
    Ok(())
}

pub fn check_container_elem_type(tag: u8, position: ElementPosition) -> Result<()> {
    if !is_decodable_code(tag) {
        return Err(Error::InvalidElementType { tag, position });
    }
    Ok(())
}

// only called once the tags passed `check_container_elem_type`.
fn check_weighted_size(size: i32, budget: Option<i32>, tags: &[(u8, ElementPosition)]) -> Result<()> {
    let Some(budget) = budget else { return Ok(()) };

    let weight: usize = tags.iter()
        .filter_map(|(tag, _)| TypeTag::from_u8(*tag))
        .map(TypeTag::min_encoded_size)
        .sum();

    let size_bytes = (size as usize).saturating_mul(weight);
    if size_bytes > budget as usize {
        return Err(Error::ContainerSizeExceedsBudget { size, budget });
    }
    Ok(())
}



pub struct GuardedDecoder<P> {
    inner: P,
    config: GuardConfig,
}

impl<P> GuardedDecoder<P> {
    pub fn new(inner: P) -> GuardedDecoder<P> {
        GuardedDecoder::with_config(inner, GuardConfig::default())
    }

    pub fn with_config(inner: P, config: GuardConfig) -> GuardedDecoder<P> {
        GuardedDecoder { inner, config }
    }

    /// Sets the ceiling on declared container sizes. Negative disables it.
    ///
    /// Meant to be called before decoding starts.
    pub fn configure_max_read_length(&mut self, max_read_length: i32) {
        tracing::debug!(max_read_length, "configured container size budget");
        self.config.max_read_length = Some(max_read_length);
    }

    pub fn max_read_length(&self) -> Option<i32> {
        self.config.budget()
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &P {
        &self.inner
    }

    pub fn into_inner(self) -> P {
        self.inner
    }


    fn check_header(&self, kind: ContainerKind, size: i32, tags: &[(u8, ElementPosition)]) -> Result<()> {
        let result = self._check_header(size, tags);
        if let Err(error) = &result {
            tracing::debug!(%kind, size, budget = ?self.config.budget(), %error, "rejected container header");
        }
        result
    }

    fn _check_header(&self, size: i32, tags: &[(u8, ElementPosition)]) -> Result<()> {
        let budget = self.config.budget();

        check_container_size(size, budget)?;
        for (tag, position) in tags {
            check_container_elem_type(*tag, *position)?;
        }

        if self.config.per_type_minimum {
            check_weighted_size(size, budget, tags)?;
        }
        Ok(())
    }
}

impl<'de, P: Protocol<'de>> Protocol<'de> for GuardedDecoder<P> {
    fn read_struct_begin(&mut self) -> Result<()> { self.inner.read_struct_begin() }
    fn read_struct_end(&mut self) -> Result<()> { self.inner.read_struct_end() }

    fn read_field_begin(&mut self) -> Result<FieldHeader> { self.inner.read_field_begin() }
    fn read_field_end(&mut self) -> Result<()> { self.inner.read_field_end() }

    fn read_list_begin(&mut self) -> Result<ListHeader> {
        let header = self.inner.read_list_begin()?;
        self.check_header(header.kind(), header.size, &[
            (header.elem_type, ElementPosition::Element),
        ])?;
        Ok(header)
    }

    fn read_list_end(&mut self) -> Result<()> { self.inner.read_list_end() }

    fn read_set_begin(&mut self) -> Result<SetHeader> {
        let header = self.inner.read_set_begin()?;
        self.check_header(header.kind(), header.size, &[
            (header.elem_type, ElementPosition::Element),
        ])?;
        Ok(header)
    }

    fn read_set_end(&mut self) -> Result<()> { self.inner.read_set_end() }

    fn read_map_begin(&mut self) -> Result<MapHeader> {
        let header = self.inner.read_map_begin()?;
        self.check_header(header.kind(), header.size, &[
            (header.key_type,   ElementPosition::Key),
            (header.value_type, ElementPosition::Value),
        ])?;
        Ok(header)
    }

    fn read_map_end(&mut self) -> Result<()> { self.inner.read_map_end() }

    fn read_bool(&mut self) -> Result<bool> { self.inner.read_bool() }
    fn read_byte(&mut self) -> Result<i8> { self.inner.read_byte() }
    fn read_i16(&mut self) -> Result<i16> { self.inner.read_i16() }
    fn read_i32(&mut self) -> Result<i32> { self.inner.read_i32() }
    fn read_i64(&mut self) -> Result<i64> { self.inner.read_i64() }
    fn read_double(&mut self) -> Result<f64> { self.inner.read_double() }
    fn read_binary(&mut self) -> Result<&'de [u8]> { self.inner.read_binary() }
    fn read_string(&mut self) -> Result<&'de str> { self.inner.read_string() }
}



#[cfg(test)]
mod tests {
    use super::*;

    fn list(elem_type: u8, size: i32) -> Vec<u8> {
        let mut bytes = vec![elem_type];
        bytes.extend(size.to_be_bytes());
        bytes
    }

    fn map(key_type: u8, value_type: u8, size: i32) -> Vec<u8> {
        let mut bytes = vec![key_type, value_type];
        bytes.extend(size.to_be_bytes());
        bytes
    }

    #[test]
    fn size_checks() {
        assert!(check_container_size(0, None).is_ok());
        assert!(check_container_size(i32::MAX, None).is_ok());
        assert!(check_container_size(10, Some(10)).is_ok());
        assert!(matches!(check_container_size(11, Some(10)),
            Err(Error::ContainerSizeExceedsBudget { size: 11, budget: 10 })));
        assert!(matches!(check_container_size(1, Some(0)),
            Err(Error::ContainerSizeExceedsBudget { size: 1, budget: 0 })));
        assert!(matches!(check_container_size(i32::MIN, None),
            Err(Error::NegativeContainerSize { size: i32::MIN })));
    }

    #[test]
    fn elem_type_checks() {
        for tag in 0..=u8::MAX {
            let result = check_container_elem_type(tag, ElementPosition::Element);
            assert_eq!(result.is_ok(), is_decodable_code(tag), "tag {}", tag);
        }
    }

    #[test]
    fn negative_size_checked_before_type() {
        let bytes = list(TYPE_STOP, -1);
        let mut decoder = GuardedDecoder::new(BinaryDecoder::new(&bytes));
        assert!(matches!(decoder.read_list_begin(), Err(Error::NegativeContainerSize { size: -1 })));
    }

    #[test]
    fn budget_checked_before_type() {
        let bytes = map(TYPE_VOID, TYPE_VOID, 100);
        let mut decoder = GuardConfig::new().with_max_read_length(5).decoder(&bytes);
        assert!(matches!(decoder.read_map_begin(),
            Err(Error::ContainerSizeExceedsBudget { size: 100, budget: 5 })));
    }

    #[test]
    fn key_reported_before_value() {
        let bytes = map(TYPE_ENUM, TYPE_STOP, 1);
        let mut decoder = GuardedDecoder::new(BinaryDecoder::new(&bytes));
        assert!(matches!(decoder.read_map_begin(),
            Err(Error::InvalidElementType { tag: TYPE_ENUM, position: ElementPosition::Key })));
    }

    #[test]
    fn reconfigure() {
        let bytes = [list(TYPE_BYTE, 8), list(TYPE_BYTE, 8)].concat();
        let mut decoder = GuardedDecoder::new(BinaryDecoder::new(&bytes));
        assert_eq!(decoder.max_read_length(), None);

        decoder.configure_max_read_length(4);
        assert_eq!(decoder.max_read_length(), Some(4));
        assert!(decoder.read_list_begin().is_err());

        let mut decoder = GuardedDecoder::new(BinaryDecoder::new(&bytes));
        decoder.configure_max_read_length(-1);
        assert_eq!(decoder.max_read_length(), None);
        assert_eq!(decoder.read_list_begin().unwrap(), ListHeader { elem_type: TYPE_BYTE, size: 8 });
    }

    #[test]
    fn per_type_minimum() {
        // 2 x i64 needs at least 16 bytes
        let bytes = list(TYPE_I64, 2);
        let config = GuardConfig::new().with_max_read_length(15).with_per_type_minimum(true);
        assert!(matches!(config.decoder(&bytes).read_list_begin(),
            Err(Error::ContainerSizeExceedsBudget { size: 2, budget: 15 })));

        let config = config.with_max_read_length(16);
        assert!(config.decoder(&bytes).read_list_begin().is_ok());

        // one byte per element without the flag
        let config = GuardConfig::new().with_max_read_length(2);
        assert!(config.decoder(&bytes).read_list_begin().is_ok());
    }

    #[test]
    fn per_type_minimum_map_sums_key_and_value() {
        // 3 x (i32 + double) = 36 bytes
        let bytes = map(TYPE_I32, TYPE_DOUBLE, 3);
        let config = GuardConfig::new().with_max_read_length(35).with_per_type_minimum(true);
        assert!(config.decoder(&bytes).read_map_begin().is_err());
        let config = config.with_max_read_length(36);
        assert!(config.decoder(&bytes).read_map_begin().is_ok());
    }

    #[test]
    fn per_type_minimum_saturates() {
        let bytes = list(TYPE_I64, i32::MAX);
        let config = GuardConfig::new().with_max_read_length(i32::MAX).with_per_type_minimum(true);
        assert!(matches!(config.decoder(&bytes).read_list_begin(),
            Err(Error::ContainerSizeExceedsBudget { .. })));
    }

    #[test]
    fn passes_other_reads_through() {
        let mut bytes = vec![TYPE_I16, 0, 9];
        bytes.extend(3i32.to_be_bytes());
        bytes.extend(b"abc");
        bytes.push(TYPE_STOP);

        let mut decoder = GuardedDecoder::new(BinaryDecoder::new(&bytes));
        decoder.read_struct_begin().unwrap();
        assert_eq!(decoder.read_field_begin().unwrap(), FieldHeader { field_type: TYPE_I16, id: 9 });
        assert_eq!(decoder.read_string().unwrap(), "abc");
        decoder.read_field_end().unwrap();
        assert!(decoder.read_field_begin().unwrap().is_stop());
        decoder.read_struct_end().unwrap();
        assert_eq!(decoder.into_inner().remaining(), 0);
    }

    #[test]
    fn weighted_size_uses_every_position() {
        let tags = [(TYPE_I16, ElementPosition::Key), (TYPE_I64, ElementPosition::Value)];
        // 10 x (2 + 8)
        assert!(check_weighted_size(10, Some(100), &tags).is_ok());
        assert!(matches!(check_weighted_size(10, Some(99), &tags),
            Err(Error::ContainerSizeExceedsBudget { size: 10, budget: 99 })));
        assert!(check_weighted_size(i32::MAX, None, &tags).is_ok());
    }

    #[test]
    fn rejections_log_at_debug() {
        use std::sync::{Arc, Mutex};
        use tracing::{span, Event, Level, Metadata, Subscriber};

        struct Levels(Arc<Mutex<Vec<Level>>>);

        impl Subscriber for Levels {
            fn enabled(&self, _: &Metadata<'_>) -> bool { true }
            fn new_span(&self, _: &span::Attributes<'_>) -> span::Id { span::Id::from_u64(1) }
            fn record(&self, _: &span::Id, _: &span::Record<'_>) {}
            fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}
            fn event(&self, event: &Event<'_>) {
                self.0.lock().unwrap().push(*event.metadata().level());
            }
            fn enter(&self, _: &span::Id) {}
            fn exit(&self, _: &span::Id) {}
        }

        let levels = Arc::new(Mutex::new(vec![]));
        tracing::subscriber::with_default(Levels(levels.clone()), || {
            let bytes = list(TYPE_STOP, 1);
            assert!(GuardedDecoder::new(BinaryDecoder::new(&bytes)).read_list_begin().is_err());

            let bytes = map(TYPE_I32, TYPE_I32, -1);
            assert!(GuardedDecoder::new(BinaryDecoder::new(&bytes)).read_map_begin().is_err());
        });

        let levels = levels.lock().unwrap();
        assert_eq!(levels.len(), 2);
        assert!(levels.iter().all(|level| *level == Level::DEBUG));
    }
}
