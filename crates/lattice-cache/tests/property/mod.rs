mod prop_cache_roundtrip;
