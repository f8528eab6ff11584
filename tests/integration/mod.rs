// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

mod batch_test;
mod fetcher_test;
mod pipeline_test;
mod support;
