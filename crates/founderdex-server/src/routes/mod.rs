// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod auth;
pub mod checkout;
pub mod founders;
pub mod health;
pub mod webhook;
