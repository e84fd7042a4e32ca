//-
// Copyright (c) 2026, The Newsgraph Authors
//
// This file is part of Newsgraph.
//
// Newsgraph is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Newsgraph is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along
// with Newsgraph. If not, see <http://www.gnu.org/licenses/>.

pub mod main;

mod collect;
mod dump;
mod setup;
